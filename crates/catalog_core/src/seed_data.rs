use std::collections::BTreeMap;

use sha2::{Digest, Sha256};

use crate::product::{Product, SpecValue};

/// Bumped whenever the seed records below change.
pub const SEED_DATA_VERSION: &str = "v1";

/// The sample catalog loaded on first deployment. Every record gets
/// `created_at`/`updated_at` set to the seeding instant.
pub fn seed_products(seeded_at: &str) -> Vec<Product> {
    vec![
        seed_product(
            "ELEC001",
            "iPhone 15 Pro",
            "Electronics",
            "Apple",
            &[
                ("color", "Space Black"),
                ("storage", "256GB"),
                ("display", "6.1-inch Super Retina XDR"),
                ("camera", "48MP Main Camera"),
            ],
            &["Face ID", "5G", "Wireless Charging"],
            seeded_at,
        ),
        seed_product(
            "ELEC002",
            "MacBook Pro 14-inch",
            "Electronics",
            "Apple",
            &[
                ("processor", "M3 Pro chip"),
                ("memory", "16GB"),
                ("storage", "512GB SSD"),
                ("display", "14.2-inch Liquid Retina XDR"),
            ],
            &["Touch ID", "Thunderbolt 4", "MagSafe 3"],
            seeded_at,
        ),
        seed_product(
            "CLOTH001",
            "Classic Cotton T-Shirt",
            "Clothing",
            "Nike",
            &[
                ("material", "100% Cotton"),
                ("size", "Medium"),
                ("color", "Navy Blue"),
                ("fit", "Regular"),
            ],
            &["Breathable", "Machine Washable", "Dri-FIT Technology"],
            seeded_at,
        ),
        seed_product(
            "HOME001",
            "Smart Coffee Maker",
            "Home & Garden",
            "Keurig",
            &[
                ("capacity", "12 cups"),
                ("material", "Stainless Steel"),
                ("power", "1500W"),
                ("connectivity", "WiFi"),
            ],
            &["Programmable", "Auto Shut-off", "Mobile App Control"],
            seeded_at,
        ),
        seed_product(
            "SPORT001",
            "Professional Tennis Racket",
            "Sports & Outdoors",
            "Wilson",
            &[
                ("weight", "300g"),
                ("headSize", "100 sq in"),
                ("stringPattern", "16x19"),
                ("material", "Carbon Fiber"),
            ],
            &["Shock Absorption", "Enhanced Control", "Professional Grade"],
            seeded_at,
        ),
    ]
}

/// SHA-256 over the seed records with timestamps blanked, so two deployments
/// seeding the same data report the same fingerprint.
pub fn seed_fingerprint() -> String {
    let records = serde_json::to_string(&seed_products(""))
        .expect("serialization of seed records should not fail");
    let mut hasher = Sha256::new();
    hasher.update(SEED_DATA_VERSION.as_bytes());
    hasher.update(records.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn seed_product(
    product_id: &str,
    product_name: &str,
    category: &str,
    brand: &str,
    attributes: &[(&str, &str)],
    features: &[&str],
    seeded_at: &str,
) -> Product {
    let mut specifications: BTreeMap<String, SpecValue> = attributes
        .iter()
        .map(|(name, value)| (name.to_string(), SpecValue::from(*value)))
        .collect();
    specifications.insert("features".to_string(), SpecValue::from(features));

    Product {
        product_id: product_id.to_string(),
        product_name: product_name.to_string(),
        category: category.to_string(),
        brand: brand.to_string(),
        specifications,
        created_at: seeded_at.to_string(),
        updated_at: seeded_at.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn seed_ids_are_unique() {
        let products = seed_products("2025-10-29T12:23:12.000Z");
        let ids: BTreeSet<_> = products.iter().map(|p| p.product_id.as_str()).collect();

        assert_eq!(products.len(), 5);
        assert_eq!(ids.len(), products.len());
    }

    #[test]
    fn seed_contains_flagship_phone() {
        let products = seed_products("2025-10-29T12:23:12.000Z");
        let phone = products
            .iter()
            .find(|product| product.product_id == "ELEC001")
            .expect("ELEC001 should be seeded");

        assert_eq!(phone.product_name, "iPhone 15 Pro");
        assert_eq!(phone.created_at, "2025-10-29T12:23:12.000Z");
        assert_eq!(phone.updated_at, phone.created_at);
        assert_eq!(
            phone.specifications.get("features"),
            Some(&SpecValue::List(vec![
                "Face ID".to_string(),
                "5G".to_string(),
                "Wireless Charging".to_string(),
            ]))
        );
    }

    #[test]
    fn fingerprint_is_stable_hex_digest() {
        let first = seed_fingerprint();
        assert_eq!(first, seed_fingerprint());
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
