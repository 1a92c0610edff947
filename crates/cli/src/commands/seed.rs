//! Seed the catalog from a JSON file.
//!
//! The file is a JSON array of products without ids:
//!
//! ```json
//! [
//!   {
//!     "name": "Linen Shirt",
//!     "description": "Breathable summer shirt",
//!     "price": "49.99",
//!     "category": "men",
//!     "image_url": "https://cdn.example.com/linen-shirt.jpg"
//!   }
//! ]
//! ```

use tracing::info;

use clementine_core::catalog::NewProduct;
use clementine_core::provider::CatalogAdmin;

use super::{CliError, backend_client};

/// Create every product listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if a create
/// call fails (products created before the failure stay created).
pub async fn catalog(file_path: &str) -> Result<(), CliError> {
    let raw = std::fs::read_to_string(file_path).map_err(|source| CliError::ReadFile {
        path: file_path.to_owned(),
        source,
    })?;

    let products: Vec<NewProduct> =
        serde_json::from_str(&raw).map_err(|source| CliError::ParseFile {
            path: file_path.to_owned(),
            source,
        })?;

    info!("Seeding {} products from {file_path}", products.len());

    let client = backend_client()?;
    for product in &products {
        let created = client.create_product(product).await?;
        info!("Created {} ({})", created.name, created.id);
    }

    info!("Done: {} products created", products.len());
    Ok(())
}
