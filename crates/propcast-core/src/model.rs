use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A property listing supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    /// Free text, e.g. "2-Bedroom Condo"
    #[serde(default, rename = "type")]
    pub property_type: Option<String>,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl PropertyRecord {
    pub fn address_or_default(&self) -> &str {
        self.address.as_deref().unwrap_or("New Listing")
    }

    pub fn price_or_default(&self) -> &str {
        self.price.as_deref().unwrap_or("Contact for price")
    }

    pub fn type_or_default(&self) -> &str {
        self.property_type.as_deref().unwrap_or("Property")
    }
}

/// A successfully fetched source image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedImage {
    pub property_id: String,
    pub file_path: PathBuf,
    pub source_url: String,
}

/// One platform variant written by the transformer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedImage {
    pub original_path: PathBuf,
    pub platform: String,
    pub output_path: PathBuf,
}

/// Listing used when no properties file is given
pub fn sample_property() -> PropertyRecord {
    PropertyRecord {
        id: "prop_001".to_string(),
        address: Some("123 Maple Street, Downtown".to_string()),
        price: Some("$450,000".to_string()),
        property_type: Some("2-Bedroom Condo".to_string()),
        image_urls: vec![
            "https://cdn.britannica.com/05/157305-004-53D5D212.jpg".to_string(),
            "https://prod.rockmedialibrary.com/api/public/content/43cab7c9a2b54fe881f724d245465134?v=37e89cfd".to_string(),
            "https://d2u1z1lopyfwlx.cloudfront.net/thumbnails/9b21e39c-e784-5f98-9be2-2f9c2eeab989/c6812dce-1a47-5122-81fc-675c9de28cd8.jpg".to_string(),
            "https://www.shutterstock.com/image-illustration/3d-rendering-modern-cozy-house-600nw-1699684264.jpg".to_string(),
            "https://media.istockphoto.com/id/1396856251/photo/colonial-house.jpg?s=612x612&w=0&k=20&c=_tGiix_HTQkJj2piTsilMuVef9v2nUwEkSC9Alo89BM=".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_from_json() {
        let record: PropertyRecord = serde_json::from_str(
            r#"{"id":"p1","address":"1 Elm St","price":"$1","type":"Loft","image_urls":["https://a/1.jpg"]}"#,
        )
        .unwrap();

        assert_eq!(record.type_or_default(), "Loft");
        assert_eq!(record.image_urls.len(), 1);
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let record: PropertyRecord = serde_json::from_str(r#"{"id":"p2"}"#).unwrap();

        assert_eq!(record.address_or_default(), "New Listing");
        assert_eq!(record.price_or_default(), "Contact for price");
        assert_eq!(record.type_or_default(), "Property");
        assert!(record.image_urls.is_empty());
    }
}
