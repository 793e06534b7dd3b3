use std::collections::HashMap;
use std::fmt;

mod reader;
mod writer;

pub use reader::read_order_form;
pub use writer::write_processed;

/// Multiple product variants on one order are joined with a dash,
/// e.g. `RGB-FCIR`.
pub const PRODUCT_SEPARATOR: char = '-';

/// Column names as they appear on the order form. These are exact-match
/// sensitive: if a heading changes on the form (spelling, capitalization),
/// it has to change here too.
pub mod columns {
    pub const PK: &str = "pk";
    pub const FIELD_NAME: &str = "FieldName";
    pub const CROP: &str = "Crop";
    pub const CUSTOMER: &str = "Customer";
    pub const FARM: &str = "Farm";
    pub const VARIETY: &str = "Variety";
    pub const MANAGER: &str = "Manager";
    pub const ZONE: &str = "Zone";
    pub const ACRES: &str = "Acres";
    pub const REGION: &str = "Region";
    pub const PRODUCT: &str = "Product";
    pub const ORDER_STATUS: &str = "Order_status";
    pub const DATE_ACQUIRED: &str = "Date_Acquired";
    pub const RESHOOT: &str = "Reshoot";

    /// Columns the sorter relies on. Any of these missing from the input
    /// form are defaulted to empty and appended to the persisted header.
    pub const REQUIRED: &[&str] = &[
        PK,
        FIELD_NAME,
        CROP,
        CUSTOMER,
        FARM,
        VARIETY,
        MANAGER,
        ZONE,
        ACRES,
        REGION,
        PRODUCT,
        ORDER_STATUS,
        DATE_ACQUIRED,
        RESHOOT,
    ];
}

/// One row of the order form, addressable by column name. Unknown columns
/// are carried along untouched so the persisted ledger loses nothing.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    fields: HashMap<String, String>,
}

impl OrderRecord {
    /// Builds a record from a header and one data row. Required columns
    /// absent from the header are defaulted to the empty string.
    pub fn from_row(header: &[String], row: &csv::StringRecord) -> Self {
        let mut fields: HashMap<String, String> = header
            .iter()
            .zip(row.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();

        for column in columns::REQUIRED {
            fields.entry((*column).to_string()).or_default();
        }

        Self { fields }
    }

    /// Value of a column, empty string if absent.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.fields.insert(column.to_string(), value.into());
    }

    pub fn pk(&self) -> &str {
        self.get(columns::PK)
    }

    pub fn field_name(&self) -> &str {
        self.get(columns::FIELD_NAME)
    }

    pub fn crop(&self) -> &str {
        self.get(columns::CROP)
    }

    pub fn customer(&self) -> &str {
        self.get(columns::CUSTOMER)
    }

    pub fn farm(&self) -> &str {
        self.get(columns::FARM)
    }

    pub fn manager(&self) -> &str {
        self.get(columns::MANAGER)
    }

    pub fn product(&self) -> &str {
        self.get(columns::PRODUCT)
    }

    pub fn order_status(&self) -> &str {
        self.get(columns::ORDER_STATUS)
    }

    /// The product variants this order expects, split on the dash separator.
    pub fn product_variants(&self) -> impl Iterator<Item = &str> {
        self.product().split(PRODUCT_SEPARATOR)
    }

    /// Two orders describe the same deliverable when customer, farm and
    /// field name all agree. This is the duplicate-detection key.
    pub fn same_identity(&self, other: &OrderRecord) -> bool {
        self.customer() == other.customer()
            && self.farm() == other.farm()
            && self.field_name() == other.field_name()
    }

    /// Records a fulfilled order: acquisition date from the delivered
    /// files, reshoot flag derived from the previous status, then the
    /// status itself flips to `Complete`.
    pub fn mark_fulfilled(&mut self, date: &str) {
        let reshoot = match self.order_status() {
            "" | "Incomplete" => "False".to_string(),
            "Complete" => "True".to_string(),
            other => format!(
                "Unknown (previous order status '{other}' was neither \"Complete\" nor \"Incomplete\")"
            ),
        };
        self.set(columns::DATE_ACQUIRED, date);
        self.set(columns::RESHOOT, reshoot);
        self.set(columns::ORDER_STATUS, "Complete");
    }

    /// Records an order that did not pass the completeness check. An order
    /// already marked `Complete` keeps its status and gets flagged for a
    /// reshoot instead of being reverted.
    pub fn mark_unfulfilled(&mut self) {
        if self.order_status() == "Complete" {
            self.set(columns::RESHOOT, "True");
        } else {
            self.set(columns::ORDER_STATUS, "Incomplete");
        }
    }

    /// Row values in the given header's column order.
    pub fn values_for<'a>(&'a self, header: &'a [String]) -> Vec<&'a str> {
        header.iter().map(|column| self.get(column)).collect()
    }
}

impl fmt::Display for OrderRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pk: {}, field_name: {}, crop: {}, customer: {}, farm: {}, manager: {}",
            self.pk(),
            self.field_name(),
            self.crop(),
            self.customer(),
            self.farm(),
            self.manager()
        )
    }
}

/// The whole order form: header in original column order (required columns
/// appended at the end) plus one record per row.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub header: Vec<String>,
    pub orders: Vec<OrderRecord>,
}

impl Ledger {
    /// A CSV line of the header, for diagnostic files that should themselves
    /// be readable order forms.
    pub fn header_line(&self) -> String {
        self.header.join(",")
    }
}
