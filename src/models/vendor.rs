//! Grocery vendors a receipt can come from.

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vendor {
    Continente,
    PingoDoce,
    Other,
}

impl Vendor {
    pub fn id(self) -> i32 {
        match self {
            Vendor::Continente => 1,
            Vendor::PingoDoce => 2,
            Vendor::Other => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vendor::Continente => "Continente",
            Vendor::PingoDoce => "Pingo Doce",
            Vendor::Other => "Other",
        }
    }

    pub fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Vendor::Continente),
            2 => Some(Vendor::PingoDoce),
            3 => Some(Vendor::Other),
            _ => None,
        }
    }

    /// Guess the vendor from an uploaded receipt's file name.
    ///
    /// Continente names its PDFs after itself; every other uploaded receipt
    /// is a Pingo Doce one. Without a file name there is nothing to go on.
    pub fn from_file_name(file_name: Option<&str>) -> Option<Self> {
        file_name.map(|name| {
            if name.contains("Continente") {
                Vendor::Continente
            } else {
                Vendor::PingoDoce
            }
        })
    }
}

/// Serialized as `{ "id": 1, "name": "Continente" }` for the dashboard.
impl Serialize for Vendor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Vendor", 2)?;
        state.serialize_field("id", &self.id())?;
        state.serialize_field("name", self.name())?;
        state.end()
    }
}
