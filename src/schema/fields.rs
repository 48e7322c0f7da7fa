// src/schema/fields.rs

use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};

use crate::error::TenderError;

pub const FIELD_COUNT: usize = 13;

/// The fixed set of columns every tender record carries.
/// Declaration order is the display and export order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LogicalField {
    Title,
    Attachment,
    ContractingEntityName,
    PublicationDate,
    TenderClosingDate,
    ExpectedContractStartDate,
    ContactInfoName,
    ContactInfoEmail,
    ContactInfoPhone,
    ReferenceNumber,
    SolicitationNumber,
    Unspsc,
    UnspscDescription,
}

impl LogicalField {
    pub const ALL: [LogicalField; FIELD_COUNT] = [
        LogicalField::Title,
        LogicalField::Attachment,
        LogicalField::ContractingEntityName,
        LogicalField::PublicationDate,
        LogicalField::TenderClosingDate,
        LogicalField::ExpectedContractStartDate,
        LogicalField::ContactInfoName,
        LogicalField::ContactInfoEmail,
        LogicalField::ContactInfoPhone,
        LogicalField::ReferenceNumber,
        LogicalField::SolicitationNumber,
        LogicalField::Unspsc,
        LogicalField::UnspscDescription,
    ];

    /// Columns the query engine accepts as sort keys.
    pub const SORTABLE: [LogicalField; 3] = [
        LogicalField::Title,
        LogicalField::ContractingEntityName,
        LogicalField::PublicationDate,
    ];

    /// Position in the canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Identifier as it appears (after normalization) in the feed header.
    pub fn id(self) -> &'static str {
        match self {
            LogicalField::Title => "title",
            LogicalField::Attachment => "attachment",
            LogicalField::ContractingEntityName => "contractingEntityName",
            LogicalField::PublicationDate => "publicationDate",
            LogicalField::TenderClosingDate => "tenderClosingDate",
            LogicalField::ExpectedContractStartDate => "expectedContractStartDate",
            LogicalField::ContactInfoName => "contactInfoName",
            LogicalField::ContactInfoEmail => "contactInfoEmail",
            LogicalField::ContactInfoPhone => "contactInfoPhone",
            LogicalField::ReferenceNumber => "referenceNumber",
            LogicalField::SolicitationNumber => "solicitationNumber",
            LogicalField::Unspsc => "unspsc",
            LogicalField::UnspscDescription => "unspscDescription",
        }
    }

    /// Human-readable column label, used in the export header line.
    pub fn label(self) -> &'static str {
        match self {
            LogicalField::Title => "Title",
            LogicalField::Attachment => "Attachments",
            LogicalField::ContractingEntityName => "Contracting Entity",
            LogicalField::PublicationDate => "Published Date",
            LogicalField::TenderClosingDate => "Closing Date",
            LogicalField::ExpectedContractStartDate => "Start Date",
            LogicalField::ContactInfoName => "Contact Name",
            LogicalField::ContactInfoEmail => "Email",
            LogicalField::ContactInfoPhone => "Phone",
            LogicalField::ReferenceNumber => "Reference #",
            LogicalField::SolicitationNumber => "Solicitation #",
            LogicalField::Unspsc => "UNSPSC",
            LogicalField::UnspscDescription => "UNSPSC Description",
        }
    }

    pub fn is_sortable(self) -> bool {
        Self::SORTABLE.contains(&self)
    }

    /// Look up a field by its exact identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.id() == id)
    }
}

impl fmt::Display for LogicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for LogicalField {
    type Err = TenderError;

    /// Accepts the exact identifier, or the identifier ignoring ASCII case
    /// (handy on the command line: `--sort publicationdate`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::from_id(s)
            .or_else(|| {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|f| f.id().eq_ignore_ascii_case(s))
            })
            .ok_or_else(|| TenderError::UnknownField(s.to_string()))
    }
}

impl Serialize for LogicalField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_declaration_order() {
        for (i, f) in LogicalField::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
        assert_eq!(LogicalField::ALL[0].id(), "title");
        assert_eq!(LogicalField::ALL[FIELD_COUNT - 1].id(), "unspscDescription");
    }

    #[test]
    fn only_three_fields_sort() {
        let sortable: Vec<_> = LogicalField::ALL
            .iter()
            .filter(|f| f.is_sortable())
            .map(|f| f.id())
            .collect();
        assert_eq!(
            sortable,
            vec!["title", "contractingEntityName", "publicationDate"]
        );
    }

    #[test]
    fn parse_from_cli_text() {
        assert_eq!(
            "publicationDate".parse::<LogicalField>().ok(),
            Some(LogicalField::PublicationDate)
        );
        assert_eq!(
            "CONTRACTINGENTITYNAME".parse::<LogicalField>().ok(),
            Some(LogicalField::ContractingEntityName)
        );
        assert!(matches!(
            "budget".parse::<LogicalField>(),
            Err(TenderError::UnknownField(name)) if name == "budget"
        ));
    }
}
