//! Catalog seeding command.
//!
//! Inserts a starter set of experiences so a fresh environment has
//! something to browse. Seeding is idempotent: rows whose slug already
//! exists are skipped.

use rust_decimal::Decimal;

use everwish_core::Slug;

use super::{CommandError, connect};

struct SeedExperience {
    title: &'static str,
    category: &'static str,
    subcategory: Option<&'static str>,
    short_desc: &'static str,
    description: &'static str,
    base_price: Decimal,
    thumbnail_url: &'static str,
    template_type: &'static str,
    is_featured: bool,
}

fn starter_catalog() -> Vec<SeedExperience> {
    vec![
        SeedExperience {
            title: "Romantic Candlelight Dinner",
            category: "experience",
            subcategory: Some("dinner-movie"),
            short_desc: "Intimate candlelight dinner setup for two",
            description: "Create the perfect romantic atmosphere with a premium candlelight \
                 dinner setup: elegant table setting, premium candles, rose petals, and ambient \
                 lighting. Perfect for anniversaries, proposals, or special date nights.",
            base_price: Decimal::new(299_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1517248135467-4c7edcad34c4?w=400",
            template_type: "special",
            is_featured: true,
        },
        SeedExperience {
            title: "Birthday Surprise Setup",
            category: "decoration",
            subcategory: Some("surprise"),
            short_desc: "Complete birthday surprise decoration package",
            description: "Transform any space into a birthday wonderland: balloons, banners, \
                 confetti, photo booth props, and personalized decorations.",
            base_price: Decimal::new(249_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1464349095431-e9a21285b5f3?w=400",
            template_type: "standard",
            is_featured: true,
        },
        SeedExperience {
            title: "Kids Theme Party - Superhero",
            category: "decoration",
            subcategory: Some("theme-parties"),
            short_desc: "Superhero themed party for kids",
            description: "Action-packed superhero party setup with themed decorations, \
                 costumes, games, and superhero treats.",
            base_price: Decimal::new(199_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1578662996442-48f60103fc96?w=400",
            template_type: "standard",
            is_featured: false,
        },
        SeedExperience {
            title: "Anniversary Terrace Celebration",
            category: "experience",
            subcategory: Some("anniversary"),
            short_desc: "Private rooftop celebration with dinner and decor",
            description: "A private terrace evening with fairy lights, floral decor, a curated \
                 dinner, and a dedicated host. Add-ons available for live music and photography.",
            base_price: Decimal::new(449_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1519671482749-fd09be7ccebf?w=400",
            template_type: "special",
            is_featured: true,
        },
        SeedExperience {
            title: "Corporate Team Building Event",
            category: "experience",
            subcategory: None,
            short_desc: "Professional team building activities and setup",
            description: "Ice-breaker activities, problem-solving challenges, team games, and \
                 professional facilitation for companies strengthening team bonds.",
            base_price: Decimal::new(499_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1521737711867-e3b97375f902?w=400",
            template_type: "standard",
            is_featured: false,
        },
        SeedExperience {
            title: "Baby Shower Pastel Decor",
            category: "decoration",
            subcategory: Some("baby-shower"),
            short_desc: "Soft pastel decoration package for baby showers",
            description: "Pastel balloon arches, welcome signage, table styling, and a photo \
                 corner, set up and taken down by our decorators.",
            base_price: Decimal::new(179_900, 2),
            thumbnail_url: "https://images.unsplash.com/photo-1530103862676-de8c9debad1d?w=400",
            template_type: "standard",
            is_featured: false,
        },
    ]
}

/// Seed the catalog with starter experiences.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let catalog = starter_catalog();
    let mut inserted = 0_u32;

    for seed in &catalog {
        let slug = Slug::from_title(seed.title);

        let result = sqlx::query(
            "INSERT INTO experiences (title, slug, category, subcategory, description, \
                 short_desc, base_price, images, thumbnail_url, template_type, is_featured) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, '{}', $8, $9, $10) \
             ON CONFLICT (slug) DO NOTHING",
        )
        .bind(seed.title)
        .bind(&slug)
        .bind(seed.category)
        .bind(seed.subcategory)
        .bind(seed.description)
        .bind(seed.short_desc)
        .bind(seed.base_price)
        .bind(seed.thumbnail_url)
        .bind(seed.template_type)
        .bind(seed.is_featured)
        .execute(&pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
            tracing::info!("Seeded experience: {slug}");
        } else {
            tracing::info!("Skipped existing experience: {slug}");
        }
    }

    tracing::info!("Seeding complete: {inserted}/{} inserted", catalog.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_catalog_slugs_are_unique() {
        let catalog = starter_catalog();
        let mut slugs: Vec<String> = catalog
            .iter()
            .map(|s| Slug::from_title(s.title).into_inner())
            .collect();
        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), catalog.len());
    }
}
