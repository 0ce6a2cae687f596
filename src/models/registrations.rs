use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-person price inside a group package.
pub const GROUP_PRICE_PER_PERSON: u32 = 400;
pub const SINGLE_PRICE: u32 = 500;
pub const GROUP_SIZE: usize = 4;
/// Members entered next to the primary attendee on a group pass.
pub const GROUP_MEMBER_COUNT: usize = GROUP_SIZE - 1;
pub const GROUP_PRICE: u32 = GROUP_PRICE_PER_PERSON * GROUP_SIZE as u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegistrationType {
    #[default]
    Single,
    Group,
}

impl RegistrationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationType::Single => "SINGLE",
            RegistrationType::Group => "GROUP",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SINGLE" => Some(RegistrationType::Single),
            "GROUP" => Some(RegistrationType::Group),
            _ => None,
        }
    }

    /// Amount owed for one registration of this type. A group pass is one
    /// package price no matter how the member slots are filled.
    pub fn price(&self) -> u32 {
        match self {
            RegistrationType::Single => SINGLE_PRICE,
            RegistrationType::Group => GROUP_PRICE,
        }
    }

    pub fn attendees(&self) -> usize {
        match self {
            RegistrationType::Single => 1,
            RegistrationType::Group => GROUP_SIZE,
        }
    }

    pub fn pass_label(&self) -> &'static str {
        match self {
            RegistrationType::Single => "Single Pass",
            RegistrationType::Group => "Group Pass",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub parent_husband_mobile: String,
    pub registration_type: RegistrationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_members: Option<Vec<GroupMember>>,
    pub ticket_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Registration {
    pub fn members(&self) -> &[GroupMember] {
        self.group_members.as_deref().unwrap_or(&[])
    }
}
