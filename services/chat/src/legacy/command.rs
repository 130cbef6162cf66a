//! Keyword command grammar.
//!
//! Keywords match case-insensitively on a word boundary; arguments are handed on
//! trimmed but otherwise as typed.

/// Quick-reply callbacks that are not themselves commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Button {
    RegisterTrucker,
    RegisterShipper,
    SearchLoads,
    /// The pickup button only explains how to enter the code.
    PickupPrompt(String),
    ViewTicket,
    ViewStatus,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Greeting,
    RegisterTrucker(String),
    RegisterShipper(String),
    Post(String),
    MyLoads,
    Load(String),
    Book(String),
    Status,
    Track(String),
    Arrived(String),
    Pickup(String),
    Deliver(String),
    Cancel(String),
    Delay(String),
    Negotiate(String),
    Emergency,
    Breakdown,
    Support(String),
    RegisterHint,
    LoadHint,
    MenuSelection(u8),
    Button(Button),
    Invalid(String),
}

/// Rest of `input` after `keyword`, if `input` starts with it as a whole word.
fn strip_keyword<'a>(input: &'a str, keyword: &str) -> Option<&'a str> {
    let head = input.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &input[keyword.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn parse_callback(token: &str) -> Command {
    let upper = token.to_uppercase();
    let action = upper
        .strip_prefix("BUTTON_")
        .or_else(|| upper.strip_prefix("ACTION_"))
        .unwrap_or(&upper);
    match action {
        "REGISTER_TRUCKER" => return Command::Button(Button::RegisterTrucker),
        "REGISTER_SHIPPER" => return Command::Button(Button::RegisterShipper),
        "SEARCH_LOADS" => return Command::Button(Button::SearchLoads),
        "VIEW_TICKET" => return Command::Button(Button::ViewTicket),
        "VIEW_STATUS" => return Command::Button(Button::ViewStatus),
        _ => {}
    }
    let Some((verb, target)) = action.split_once('_') else {
        return Command::Button(Button::Other(action.to_owned()));
    };
    let target = target.to_owned();
    match verb {
        "BOOK" => Command::Book(target),
        "ARRIVED" => Command::Arrived(target),
        "PICKUP" => Command::Button(Button::PickupPrompt(target)),
        "DELIVER" => Command::Deliver(target),
        "CANCEL" => Command::Cancel(target),
        _ => Command::Button(Button::Other(action.to_owned())),
    }
}

impl Command {
    pub fn parse(raw: &str) -> Self {
        let input = raw.trim();
        if input.is_empty() {
            return Self::Invalid(String::new());
        }
        if !input.contains(char::is_whitespace) && input.contains('_') {
            return parse_callback(input);
        }

        let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
        match normalized.to_uppercase().as_str() {
            "HI" | "HELLO" | "START" => return Self::Greeting,
            "S" => return Self::Status,
            "SOS" => return Self::Emergency,
            "MY LOADS" => return Self::MyLoads,
            "R" | "REG" => return Self::RegisterHint,
            "L" => return Self::LoadHint,
            n @ ("1" | "2" | "3" | "4" | "5") => {
                if let Ok(n) = n.parse() {
                    return Self::MenuSelection(n);
                }
            }
            _ => {}
        }

        let prefixed: [(&str, fn(String) -> Self); 13] = [
            ("REGISTER SHIPPER", Self::RegisterShipper),
            ("REGISTER", Self::RegisterTrucker),
            ("POST", Self::Post),
            ("LOAD", Self::Load),
            ("BOOK", Self::Book),
            ("TRACK", Self::Track),
            ("ARRIVED", Self::Arrived),
            ("PICKUP", Self::Pickup),
            ("DELIVER", Self::Deliver),
            ("CANCEL", Self::Cancel),
            ("DELAY", Self::Delay),
            ("NEGOTIATE", Self::Negotiate),
            ("SUPPORT", Self::Support),
        ];
        for (keyword, build) in prefixed {
            if let Some(rest) = strip_keyword(&normalized, keyword) {
                return build(rest.to_owned());
            }
        }

        if strip_keyword(&normalized, "HELP").is_some() {
            Self::Help
        } else if strip_keyword(&normalized, "STATUS").is_some() {
            Self::Status
        } else if strip_keyword(&normalized, "EMERGENCY").is_some() {
            Self::Emergency
        } else if strip_keyword(&normalized, "BREAKDOWN").is_some() {
            Self::Breakdown
        } else {
            Self::Invalid(input.to_owned())
        }
    }

    /// Commands a registered user may send from inside a guided conversation.
    pub fn is_delegated(&self) -> bool {
        matches!(
            self,
            Self::Help
                | Self::Post(_)
                | Self::MyLoads
                | Self::Load(_)
                | Self::Book(_)
                | Self::Status
                | Self::Track(_)
                | Self::Arrived(_)
                | Self::Pickup(_)
                | Self::Deliver(_)
                | Self::Cancel(_)
                | Self::Delay(_)
                | Self::Negotiate(_)
                | Self::Emergency
                | Self::Breakdown
                | Self::Support(_)
                | Self::Button(Button::PickupPrompt(_))
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Greeting => "greeting",
            Self::RegisterTrucker(_) => "register",
            Self::RegisterShipper(_) => "register_shipper",
            Self::Post(_) => "post",
            Self::MyLoads => "my_loads",
            Self::Load(_) => "load",
            Self::Book(_) => "book",
            Self::Status => "status",
            Self::Track(_) => "track",
            Self::Arrived(_) => "arrived",
            Self::Pickup(_) => "pickup",
            Self::Deliver(_) => "deliver",
            Self::Cancel(_) => "cancel",
            Self::Delay(_) => "delay",
            Self::Negotiate(_) => "negotiate",
            Self::Emergency => "emergency",
            Self::Breakdown => "breakdown",
            Self::Support(_) => "support",
            Self::RegisterHint => "register_hint",
            Self::LoadHint => "load_hint",
            Self::MenuSelection(_) => "menu_selection",
            Self::Button(_) => "button",
            Self::Invalid(_) => "invalid",
        }
    }
}
