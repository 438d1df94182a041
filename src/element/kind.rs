use std::fmt;

/// Tag identifying an element's concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    Button,
    Pressable,
    Grid,
    GridItem,
    Popover,
    PopoverTarget,
    PopoverContent,
}

impl ElementKind {
    /// The upper-case tag used in messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Button => "BUTTON",
            Self::Pressable => "PRESSABLE",
            Self::Grid => "GRID",
            Self::GridItem => "GRID_ITEM",
            Self::Popover => "POPOVER",
            Self::PopoverTarget => "POPOVER_TARGET",
            Self::PopoverContent => "POPOVER_CONTENT",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
