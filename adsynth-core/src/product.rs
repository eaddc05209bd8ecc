use crate::error::{ConfigError, CoreError};
use crate::types::ProductInfo;
use std::fs;
use std::path::Path;
use tracing::info;

/// Load product information from a JSON file, or TOML when the extension is `.toml`.
pub fn load_product_info(path: &Path) -> Result<ProductInfo, CoreError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let content = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let product: ProductInfo = if is_toml {
        toml::from_str(&content).map_err(ConfigError::Parse)?
    } else {
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
            details: format!("{} is not a valid product-info JSON file: {}", path.display(), e),
        })?
    };

    info!(
        "Loaded product info for '{}' from {}",
        product.product_name,
        path.display()
    );
    Ok(product)
}
