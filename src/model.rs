/// Models offered by the startup picker, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelChoice {
    Gpt4,
    Gpt35Turbo,
}

impl ModelChoice {
    pub const ALL: [ModelChoice; 2] = [ModelChoice::Gpt4, ModelChoice::Gpt35Turbo];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt35Turbo => "gpt-3.5-turbo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Gpt4 => "GPT-4",
            Self::Gpt35Turbo => "GPT-3.5 Turbo",
        }
    }

    /// Maps the picker's menu number to a model. Only the exact strings "1"
    /// and "2" are accepted.
    pub fn from_selection(input: &str) -> Option<Self> {
        match input {
            "1" => Some(Self::Gpt4),
            "2" => Some(Self::Gpt35Turbo),
            _ => None,
        }
    }
}
