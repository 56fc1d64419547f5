use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// An ordered table of text cells loaded from one source workbook.
///
/// Every cell is kept as text regardless of how it was typed in the source so
/// that leading zeros and locale formatting survive until numeric coercion.
/// `None` marks an absent cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RecordSet {
    /// Creates an empty record set with the given column headers.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Short rows are padded with absent cells, long rows are
    /// truncated to the header width.
    pub fn push_row(&mut self, mut row: Vec<Option<String>>) {
        row.resize(self.headers.len(), None);
        self.rows.push(row);
    }

    /// Builder form of [`RecordSet::push_row`] taking plain text cells.
    pub fn with_row<I, S>(mut self, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = cells.into_iter().map(|cell| Some(cell.into())).collect();
        self.push_row(row);
        self
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the column carrying exactly this header.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|candidate| candidate == header)
    }

    /// Cell at `row` in the column named `header`, if both exist and the cell
    /// is present.
    pub fn value(&self, row: usize, header: &str) -> Option<&str> {
        let column = self.column_index(header)?;
        self.cell(row, column)
    }

    pub(crate) fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Overwrites the cell at `row` in the column named `header`. Unknown
    /// headers and out-of-range rows are ignored.
    pub fn set_value(&mut self, row: usize, header: &str, value: impl Into<String>) {
        if let Some(column) = self.column_index(header) {
            if let Some(cell) = self.rows.get_mut(row).and_then(|cells| cells.get_mut(column)) {
                *cell = Some(value.into());
            }
        }
    }

    /// Iterates over the cells of one column in row order. A missing column
    /// yields absent cells for every row.
    pub fn column<'a>(&'a self, header: &str) -> impl Iterator<Item = Option<&'a str>> + use<'a> {
        let column = self.column_index(header);
        (0..self.rows.len()).map(move |row| column.and_then(|column| self.cell(row, column)))
    }
}

/// Semantic columns the merger knows how to locate in arbitrary workbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    LocationCode,
    LocationName,
    ItemCode,
    ItemDescription,
    MinimumQuantity,
    InventoryOnHand,
    SalesTotal,
    MovementQuantity,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::LocationCode,
        CanonicalField::LocationName,
        CanonicalField::ItemCode,
        CanonicalField::ItemDescription,
        CanonicalField::MinimumQuantity,
        CanonicalField::InventoryOnHand,
        CanonicalField::SalesTotal,
        CanonicalField::MovementQuantity,
    ];

    /// Header spellings accepted for the field, in priority order. Matching
    /// is case and diacritic insensitive.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::LocationCode => &[
                "depo kodu",
                "depo_kodu",
                "magaza kodu",
                "mağaza kodu",
                "warehouse code",
                "store code",
                "site code",
            ],
            CanonicalField::LocationName => &[
                "depo adı",
                "depo adi",
                "magaza adı",
                "mağaza adı",
                "warehouse name",
                "store name",
            ],
            CanonicalField::ItemCode => &[
                "madde kodu",
                "urun kodu",
                "ürün kodu",
                "sku",
                "item code",
                "product code",
                "stok kodu",
            ],
            CanonicalField::ItemDescription => &[
                "madde açıklaması",
                "urun adi",
                "ürün adı",
                "aciklama",
                "açıklama",
                "item name",
                "product name",
                "description",
            ],
            CanonicalField::MinimumQuantity => &[
                "minimum miktar",
                "min miktar",
                "min stok",
                "minimum",
                "safety stock",
                "ss",
                "min_qty",
                "min qty",
            ],
            CanonicalField::InventoryOnHand => &[
                "envanter",
                "stok",
                "qty on hand",
                "quantity on hand",
                "on hand",
            ],
            // Only total columns qualify; "satış"/"sales" are not aliases.
            CanonicalField::SalesTotal => &["toplam", "total", "genel toplam", "sum"],
            CanonicalField::MovementQuantity => &["miktar", "adet", "quantity", "qty"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalField::LocationCode => "location_code",
            CanonicalField::LocationName => "location_name",
            CanonicalField::ItemCode => "item_code",
            CanonicalField::ItemDescription => "item_description",
            CanonicalField::MinimumQuantity => "minimum_quantity",
            CanonicalField::InventoryOnHand => "inventory_on_hand",
            CanonicalField::SalesTotal => "sales_total",
            CanonicalField::MovementQuantity => "movement_quantity",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalField {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('-', "_");
        CanonicalField::ALL
            .into_iter()
            .find(|field| field.as_str() == wanted)
            .ok_or_else(|| format!("unknown field '{value}'"))
    }
}

/// Role a record set plays in the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Identity fields plus the minimum quantity. Required.
    Primary,
    /// Inventory on hand, first row per pair wins.
    Stock,
    /// Sales totals, first row per pair wins.
    Sales,
    /// Daily movements, counted per pair where the quantity is positive.
    DayCount,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::Primary,
        SourceKind::Stock,
        SourceKind::Sales,
        SourceKind::DayCount,
    ];

    /// Fields that must be located in a record set playing this role.
    pub fn required_fields(self) -> &'static [CanonicalField] {
        match self {
            SourceKind::Primary => &[
                CanonicalField::LocationCode,
                CanonicalField::LocationName,
                CanonicalField::ItemCode,
                CanonicalField::ItemDescription,
                CanonicalField::MinimumQuantity,
            ],
            SourceKind::Stock => &[
                CanonicalField::LocationCode,
                CanonicalField::ItemCode,
                CanonicalField::InventoryOnHand,
            ],
            SourceKind::Sales => &[
                CanonicalField::LocationCode,
                CanonicalField::ItemCode,
                CanonicalField::SalesTotal,
            ],
            SourceKind::DayCount => &[
                CanonicalField::LocationCode,
                CanonicalField::ItemCode,
                CanonicalField::MovementQuantity,
            ],
        }
    }

    /// The field whose values the source contributes to the merge.
    pub fn value_field(self) -> CanonicalField {
        match self {
            SourceKind::Primary => CanonicalField::MinimumQuantity,
            SourceKind::Stock => CanonicalField::InventoryOnHand,
            SourceKind::Sales => CanonicalField::SalesTotal,
            SourceKind::DayCount => CanonicalField::MovementQuantity,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Primary => "primary",
            SourceKind::Stock => "stock",
            SourceKind::Sales => "sales",
            SourceKind::DayCount => "day_count",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let wanted = value.trim().to_ascii_lowercase().replace('-', "_");
        match wanted.as_str() {
            "days" => Ok(SourceKind::DayCount),
            other => SourceKind::ALL
                .into_iter()
                .find(|kind| kind.as_str() == other)
                .ok_or_else(|| format!("unknown source '{value}'")),
        }
    }
}
