//! GST (Goods and Services Tax) registration numbers.

/// Required length of a normalized GSTIN.
pub const GST_LEN: usize = 15;

/// Uppercase and strip spaces and hyphens.
pub fn normalize_gst(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_uppercase)
        .collect()
}

/// Whether a normalized GSTIN has the required length.
pub fn is_valid_gst(normalized: &str) -> bool {
    normalized.chars().count() == GST_LEN
}

/// State name for the two-digit state code a GSTIN starts with.
///
/// Unknown codes map to `"Unknown"`.
pub fn state_from_gst(gst: &str) -> &'static str {
    match gst.get(..2).unwrap_or_default() {
        "01" => "Jammu & Kashmir",
        "02" => "Himachal Pradesh",
        "03" => "Punjab",
        "04" => "Chandigarh",
        "05" => "Uttarakhand",
        "06" => "Haryana",
        "07" => "Delhi",
        "08" => "Rajasthan",
        "09" => "Uttar Pradesh",
        "10" => "Bihar",
        "11" => "Sikkim",
        "12" => "Arunachal Pradesh",
        "13" => "Nagaland",
        "14" => "Manipur",
        "15" => "Mizoram",
        "16" => "Tripura",
        "17" => "Meghalaya",
        "18" => "Assam",
        "19" => "West Bengal",
        "20" => "Jharkhand",
        "21" => "Odisha",
        "22" => "Chhattisgarh",
        "23" => "Madhya Pradesh",
        "24" => "Gujarat",
        "27" => "Maharashtra",
        "29" => "Karnataka",
        "32" => "Kerala",
        "33" => "Tamil Nadu",
        "36" => "Telangana",
        "37" => "Andhra Pradesh",
        _ => "Unknown",
    }
}
