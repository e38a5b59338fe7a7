use crate::model::ids::SectionId;

/// A themed group of lessons (e.g. "Control Structures").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    id: SectionId,
    title: String,
    description: String,
    color: String,
    order: u32,
}

impl Section {
    #[must_use]
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        description: impl Into<String>,
        color: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            color: color.into(),
            order,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Display color, usually a `#RRGGBB` hex string.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }
}
