//! Resource kinds exposed by the Pipedrive API
//!
//! Each kind is pure configuration: a name, the endpoint it maps to and the
//! operations it allows. All behavior lives in `ResourceClient`.

use super::pluralization;
use anyhow::anyhow;
use std::fmt;
use std::str::FromStr;

/// Operations a resource kind allows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub read: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl Capabilities {
    pub const CRUD: Self = Self {
        read: true,
        create: true,
        update: true,
        delete: true,
    };

    pub const READ_ONLY: Self = Self {
        read: true,
        create: false,
        update: false,
        delete: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Activity,
    ActivityType,
    Currency,
    Deal,
    DealField,
    File,
    Filter,
    Goal,
    Note,
    Organization,
    OrganizationField,
    Person,
    PersonField,
    Pipeline,
    Product,
    ProductField,
    Role,
    SearchResult,
    Stage,
    User,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Activity,
        ResourceKind::ActivityType,
        ResourceKind::Currency,
        ResourceKind::Deal,
        ResourceKind::DealField,
        ResourceKind::File,
        ResourceKind::Filter,
        ResourceKind::Goal,
        ResourceKind::Note,
        ResourceKind::Organization,
        ResourceKind::OrganizationField,
        ResourceKind::Person,
        ResourceKind::PersonField,
        ResourceKind::Pipeline,
        ResourceKind::Product,
        ResourceKind::ProductField,
        ResourceKind::Role,
        ResourceKind::SearchResult,
        ResourceKind::Stage,
        ResourceKind::User,
    ];

    /// Singular lowerCamelCase name of the kind
    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Activity => "activity",
            ResourceKind::ActivityType => "activityType",
            ResourceKind::Currency => "currency",
            ResourceKind::Deal => "deal",
            ResourceKind::DealField => "dealField",
            ResourceKind::File => "file",
            ResourceKind::Filter => "filter",
            ResourceKind::Goal => "goal",
            ResourceKind::Note => "note",
            ResourceKind::Organization => "organization",
            ResourceKind::OrganizationField => "organizationField",
            ResourceKind::Person => "person",
            ResourceKind::PersonField => "personField",
            ResourceKind::Pipeline => "pipeline",
            ResourceKind::Product => "product",
            ResourceKind::ProductField => "productField",
            ResourceKind::Role => "role",
            ResourceKind::SearchResult => "searchResult",
            ResourceKind::Stage => "stage",
            ResourceKind::User => "user",
        }
    }

    /// Endpoint name, e.g. `persons` or `activityTypes`
    pub fn entity_name(&self) -> String {
        pluralization::entity_name(self.name())
    }

    pub fn capabilities(&self) -> Capabilities {
        match self {
            ResourceKind::Currency | ResourceKind::User => Capabilities::READ_ONLY,
            _ => Capabilities::CRUD,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    /// Accepts kind names (`activityType`, `activity-type`, `activity_type`)
    /// and entity names (`activityTypes`, `persons`), case-insensitively.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let wanted = normalize(s);
        ResourceKind::ALL
            .iter()
            .copied()
            .find(|kind| normalize(kind.name()) == wanted || normalize(&kind.entity_name()) == wanted)
            .ok_or_else(|| anyhow!("unknown resource '{}'", s))
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}
