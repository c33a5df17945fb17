//! Google Books volume lookup, used to prefill the new-book form when a
//! writer supplies only a volume id.

use serde::Deserialize;

use crate::{error::AppError, forms::NewBook};

const VOLUMES_URL: &str = "https://www.googleapis.com/books/v1/volumes";

#[derive(Debug, Default, Deserialize)]
pub struct VolumeResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default, rename = "volumeInfo")]
    pub volume_info: VolumeInfo,
    #[serde(default, rename = "saleInfo")]
    pub sale_info: SaleInfo,
}

#[derive(Debug, Default, Deserialize)]
pub struct VolumeInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default, rename = "publishedDate")]
    pub published_date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "pageCount")]
    pub page_count: i32,
    #[serde(default, rename = "maturityRating")]
    pub maturity_rating: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, rename = "industryIdentifiers")]
    pub industry_identifiers: Vec<IndustryIdentifier>,
    #[serde(default, rename = "imageLinks")]
    pub image_links: ImageLinks,
}

#[derive(Debug, Default, Deserialize)]
pub struct IndustryIdentifier {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub identifier: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImageLinks {
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub small: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleInfo {
    #[serde(default, rename = "retailPrice")]
    pub retail: Option<RetailPrice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RetailPrice {
    #[serde(default)]
    pub amount: f64,
    #[serde(default, rename = "currencyCode")]
    pub currency_code: String,
}

/// Fetch a volume's metadata. An unknown volume id is the caller's mistake
/// and maps to 404; transport or decode failures surface as an error
/// response for this request only.
pub async fn lookup_volume(
    http: &reqwest::Client,
    volume_id: &str,
    api_key: &str,
) -> Result<VolumeResponse, AppError> {
    let response = http
        .get(format!("{VOLUMES_URL}/{volume_id}"))
        .query(&[("key", api_key)])
        .send()
        .await?;

    classify_status(response.status())?;
    let response = response.error_for_status()?;

    Ok(response.json().await?)
}

/// Separate the one upstream status a client can correct from the rest.
fn classify_status(status: reqwest::StatusCode) -> Result<(), AppError> {
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(AppError::NotFound);
    }

    Ok(())
}

impl VolumeResponse {
    /// Map API metadata into the new-book payload, attributed to the
    /// uploading writer.
    pub fn into_new_book(self, uploader: &str) -> NewBook {
        let info = self.volume_info;

        let price = match self.sale_info.retail {
            Some(retail) => format!("{:.2} {}", retail.amount, retail.currency_code),
            None => String::new(),
        };

        let image_link = if info.image_links.small.is_empty() {
            info.image_links.thumbnail.clone()
        } else {
            info.image_links.small.clone()
        };

        NewBook {
            volume_id: self.id,
            title: info.title,
            subtitle: info.subtitle,
            publisher: info.publisher,
            published_date: info.published_date,
            page_count: info.page_count.to_string(),
            maturity_rating: info.maturity_rating,
            authors: info.authors.join(", "),
            categories: info.categories.join(", "),
            description: info.description,
            uploader: uploader.to_string(),
            price,
            isbn10: find_identifier(&info.industry_identifiers, "ISBN_10"),
            isbn13: find_identifier(&info.industry_identifiers, "ISBN_13"),
            image_link,
        }
    }
}

fn find_identifier(identifiers: &[IndustryIdentifier], kind: &str) -> String {
    identifiers
        .iter()
        .find(|id| id.kind == kind)
        .map(|id| id.identifier.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_volume_maps_to_not_found() {
        assert!(matches!(
            classify_status(reqwest::StatusCode::NOT_FOUND),
            Err(AppError::NotFound)
        ));
        assert!(classify_status(reqwest::StatusCode::OK).is_ok());
        // Other upstream failures fall through to error_for_status.
        assert!(classify_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR).is_ok());
    }

    #[test]
    fn maps_volume_into_new_book() {
        let response: VolumeResponse = serde_json::from_value(serde_json::json!({
            "id": "vol-42",
            "volumeInfo": {
                "title": "Dune",
                "subtitle": "Deluxe Edition",
                "publisher": "Ace",
                "publishedDate": "2019-10-01",
                "description": "Spice and sand.",
                "pageCount": 704,
                "maturityRating": "NOT_MATURE",
                "authors": ["Frank Herbert"],
                "categories": ["Fiction"],
                "industryIdentifiers": [
                    { "type": "ISBN_10", "identifier": "0441013597" },
                    { "type": "ISBN_13", "identifier": "9780441013593" }
                ],
                "imageLinks": { "thumbnail": "http://example.com/t.jpg" }
            },
            "saleInfo": {
                "retailPrice": { "amount": 9.99, "currencyCode": "USD" }
            }
        }))
        .unwrap();

        let book = response.into_new_book("alice");

        assert_eq!(book.volume_id, "vol-42");
        assert_eq!(book.authors, "Frank Herbert");
        assert_eq!(book.price, "9.99 USD");
        assert_eq!(book.isbn10, "0441013597");
        assert_eq!(book.isbn13, "9780441013593");
        assert_eq!(book.image_link, "http://example.com/t.jpg");
        assert_eq!(book.uploader, "alice");
    }

    #[test]
    fn tolerates_missing_fields() {
        let response: VolumeResponse =
            serde_json::from_value(serde_json::json!({ "id": "vol-1" })).unwrap();

        let book = response.into_new_book("alice");

        assert_eq!(book.volume_id, "vol-1");
        assert!(book.title.is_empty());
        assert!(book.price.is_empty());
        assert!(book.isbn13.is_empty());
    }
}
