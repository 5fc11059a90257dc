use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sales channel category.
///
/// Stored as its snake_case string form; unknown stored values fall back
/// to [`ChannelType::Other`] on read.
///
/// # Examples
///
/// ```
/// use lichub_common::types::ChannelType;
///
/// let t: ChannelType = "direct_sales".parse().unwrap();
/// assert_eq!(t, ChannelType::DirectSales);
/// assert_eq!(t.to_string(), "direct_sales");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    RegionalAgent,
    DirectSales,
    StrategicPartner,
    Online,
    Distributor,
    SystemIntegrator,
    Other,
}

impl ChannelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelType::RegionalAgent => "regional_agent",
            ChannelType::DirectSales => "direct_sales",
            ChannelType::StrategicPartner => "strategic_partner",
            ChannelType::Online => "online",
            ChannelType::Distributor => "distributor",
            ChannelType::SystemIntegrator => "system_integrator",
            ChannelType::Other => "other",
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ChannelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regional_agent" => Ok(ChannelType::RegionalAgent),
            "direct_sales" => Ok(ChannelType::DirectSales),
            "strategic_partner" => Ok(ChannelType::StrategicPartner),
            "online" => Ok(ChannelType::Online),
            "distributor" => Ok(ChannelType::Distributor),
            "system_integrator" => Ok(ChannelType::SystemIntegrator),
            "other" => Ok(ChannelType::Other),
            _ => Err(format!("unknown channel type: {s}")),
        }
    }
}

/// License lifecycle status, ordered from healthy to expired.
///
/// # Examples
///
/// ```
/// use lichub_common::types::LicenseStatus;
///
/// let s: LicenseStatus = "critical".parse().unwrap();
/// assert_eq!(s, LicenseStatus::Critical);
/// assert_eq!(s.to_string(), "critical");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    Normal,
    Warning,
    Critical,
    Expired,
}

impl std::fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseStatus::Normal => write!(f, "normal"),
            LicenseStatus::Warning => write!(f, "warning"),
            LicenseStatus::Critical => write!(f, "critical"),
            LicenseStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for LicenseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(LicenseStatus::Normal),
            "warning" => Ok(LicenseStatus::Warning),
            "critical" => Ok(LicenseStatus::Critical),
            "expired" => Ok(LicenseStatus::Expired),
            _ => Err(format!("unknown license status: {s}")),
        }
    }
}

// ---- entity rows ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub version: String,
    pub description: Option<String>,
    /// Storage path of the uploaded binary, if any.
    pub file_path: Option<String>,
    /// Original filename as uploaded.
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub description: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub delivery_person: Option<String>,
    pub deployment_plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct License {
    pub id: i64,
    pub customer_id: i64,
    pub license_object: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub feature_code: Option<String>,
    pub valid_points: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---- list shapes (aggregated summary rows) ----

/// Channel list row: the channel plus comma-joined names of its related
/// customers and products. Aggregates are computed fresh from the
/// association tables on every read.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelListItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub description: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    /// Comma-joined distinct names of associated customers.
    pub customer_names: Option<String>,
    /// Comma-joined distinct "name vVERSION" strings of associated products.
    pub product_names: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Customer list row, including the count of licenses it owns.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerListItem {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub delivery_person: Option<String>,
    pub deployment_plan: Option<String>,
    pub channel_names: Option<String>,
    pub product_names: Option<String>,
    pub license_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---- detail shapes (fully expanded relations) ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelDetail {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
    pub description: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerDetail {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub delivery_person: Option<String>,
    pub deployment_plan: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub channels: Vec<Channel>,
    pub products: Vec<Product>,
    pub licenses: Vec<License>,
}

// ---- license shapes ----

/// A license joined with its owning customer's display fields.
/// This is the storage read shape; [`LicenseView`] adds the
/// time-dependent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: i64,
    pub customer_id: i64,
    pub license_object: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub feature_code: Option<String>,
    pub valid_points: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Wire shape for license endpoints: the joined record plus `days_left`
/// and `status` computed from an explicit `now`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LicenseView {
    pub id: i64,
    pub customer_id: i64,
    pub license_object: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub feature_code: Option<String>,
    pub valid_points: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    /// Whole days until expiry, rounded up; negative once expired.
    pub days_left: i64,
    pub status: LicenseStatus,
}

impl LicenseView {
    /// Classify `record` against `now` using the shared expiry rules.
    pub fn classified(record: LicenseRecord, now: DateTime<Utc>) -> Self {
        let (days_left, status) = crate::expiry::classify(record.end_date, now);
        Self {
            id: record.id,
            customer_id: record.customer_id,
            license_object: record.license_object,
            start_date: record.start_date,
            end_date: record.end_date,
            feature_code: record.feature_code,
            valid_points: record.valid_points,
            description: record.description,
            created_at: record.created_at,
            updated_at: record.updated_at,
            customer_name: record.customer_name,
            customer_industry: record.customer_industry,
            contact_person: record.contact_person,
            contact_phone: record.contact_phone,
            contact_email: record.contact_email,
            days_left,
            status,
        }
    }
}

// ---- association pickers ("available" option rows) ----

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CustomerOption {
    pub id: i64,
    pub name: String,
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChannelOption {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub channel_type: ChannelType,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProductOption {
    pub id: i64,
    pub name: String,
    pub version: String,
}

// ---- request payloads ----

/// Channel create/update payload. Updates are full replacements: the
/// submitted association id lists overwrite whatever is stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ChannelInput {
    pub name: Option<String>,
    /// One of the [`ChannelType`] values, as a string.
    #[serde(rename = "type")]
    pub channel_type: Option<String>,
    pub description: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub customer_ids: Vec<i64>,
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

/// Customer create/update payload; association lists replace in full.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CustomerInput {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub delivery_person: Option<String>,
    pub deployment_plan: Option<String>,
    #[serde(default)]
    pub channel_ids: Vec<i64>,
    #[serde(default)]
    pub product_ids: Vec<i64>,
}

/// License create/update payload. Dates are `YYYY-MM-DD` strings and
/// are validated (format and ordering) before anything is written.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct LicenseInput {
    pub customer_id: Option<i64>,
    pub license_object: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub feature_code: Option<String>,
    pub valid_points: Option<i64>,
    pub description: Option<String>,
}

/// Product text fields, extracted from the multipart form.
#[derive(Debug, Clone, Default)]
pub struct ProductInput {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

/// Metadata of a stored product binary, recorded on the product row.
#[derive(Debug, Clone)]
pub struct AttachmentMeta {
    /// Path of the stored file, relative to the attachment root.
    pub file_path: String,
    /// Original filename as uploaded.
    pub file_name: String,
    pub file_size: i64,
}
