//! Social post templates
//!
//! Pure and deterministic: the same description and property always produce
//! the same four posts.

use indexmap::IndexMap;
use std::fmt;

use crate::model::PropertyRecord;

/// Twitter embeds at most this many characters of the description
pub const TWITTER_DESCRIPTION_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Linkedin,
    Twitter,
}

impl SocialPlatform {
    pub const ALL: [SocialPlatform; 4] = [
        SocialPlatform::Instagram,
        SocialPlatform::Facebook,
        SocialPlatform::Linkedin,
        SocialPlatform::Twitter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::Instagram => "instagram",
            SocialPlatform::Facebook => "facebook",
            SocialPlatform::Linkedin => "linkedin",
            SocialPlatform::Twitter => "twitter",
        }
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composed post text per platform, in `SocialPlatform::ALL` order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSet {
    posts: IndexMap<SocialPlatform, String>,
}

impl PostSet {
    pub fn get(&self, platform: SocialPlatform) -> &str {
        self.posts.get(&platform).map(String::as_str).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SocialPlatform, &str)> {
        self.posts.iter().map(|(p, text)| (*p, text.as_str()))
    }
}

/// First `max` characters (not bytes) of `text`
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn twitter_excerpt(description: &str) -> String {
    let excerpt = truncate_chars(description, TWITTER_DESCRIPTION_CHARS);
    if excerpt.len() < description.len() {
        format!("{}...", excerpt)
    } else {
        description.to_string()
    }
}

/// Hashtag form of the property type: lowercase, no spaces
fn type_hashtag(property_type: &str) -> String {
    property_type.to_lowercase().replace(' ', "")
}

pub fn compose_posts(description: &str, property: &PropertyRecord) -> PostSet {
    let address = property.address_or_default();
    let price = property.price_or_default();
    let prop_type = property.type_or_default();

    let mut posts = IndexMap::new();

    posts.insert(
        SocialPlatform::Instagram,
        format!(
            "{description}\n\n\
             📍 {address}\n\
             💰 {price}\n\
             🏠 {prop_type}\n\n\
             DM for more details! 📞\n\
             .\n\
             .\n\
             #realestate #propertylisting #luxury #homeforsale #{tag} #realestateagent #newhome",
            tag = type_hashtag(prop_type),
        ),
    );

    posts.insert(
        SocialPlatform::Facebook,
        format!(
            "🏡 New Listing Alert! 🏡\n\n\
             {description}\n\n\
             📍 Location: {address}\n\
             💵 Price: {price}\n\
             🏘️ Type: {prop_type}\n\n\
             Contact us today to schedule a showing!\n\
             Schedule your tour now →"
        ),
    );

    posts.insert(
        SocialPlatform::Linkedin,
        format!(
            "Exciting New Property Listing!\n\n\
             {description}\n\n\
             Professional Details:\n\
             • Location: {address}\n\
             • Investment Value: {price}\n\
             • Category: {prop_type}\n\n\
             #RealEstate #PropertyInvestment #CommercialRealEstate #DreamHome"
        ),
    );

    posts.insert(
        SocialPlatform::Twitter,
        format!(
            "🏠 NEW: {prop_type} at {address}\n\n\
             {excerpt}\n\n\
             💰 {price}\n\n\
             Learn more → Link in bio 🔗\n\n\
             #RealEstate #HomeSale",
            excerpt = twitter_excerpt(description),
        ),
    );

    PostSet { posts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::sample_property;

    #[test]
    fn test_all_platforms_in_order() {
        let posts = compose_posts("Lovely home.", &sample_property());
        let platforms: Vec<SocialPlatform> = posts.iter().map(|(p, _)| p).collect();
        assert_eq!(platforms, SocialPlatform::ALL.to_vec());
    }

    #[test]
    fn test_deterministic() {
        let property = sample_property();
        let a = compose_posts("Bright corner unit with a balcony.", &property);
        let b = compose_posts("Bright corner unit with a balcony.", &property);
        assert_eq!(a, b);
    }

    #[test]
    fn test_instagram_template() {
        let posts = compose_posts("Lovely home.", &sample_property());
        let expected = "Lovely home.\n\n\
            📍 123 Maple Street, Downtown\n\
            💰 $450,000\n\
            🏠 2-Bedroom Condo\n\n\
            DM for more details! 📞\n\
            .\n\
            .\n\
            #realestate #propertylisting #luxury #homeforsale #2-bedroomcondo #realestateagent #newhome";
        assert_eq!(posts.get(SocialPlatform::Instagram), expected);
    }

    #[test]
    fn test_facebook_and_linkedin_embed_full_description() {
        let description = "x".repeat(300);
        let posts = compose_posts(&description, &sample_property());

        assert!(posts
            .get(SocialPlatform::Facebook)
            .starts_with("🏡 New Listing Alert! 🏡\n\n"));
        assert!(posts.get(SocialPlatform::Facebook).contains(&description));
        assert!(posts.get(SocialPlatform::Linkedin).contains(&description));
        assert!(posts
            .get(SocialPlatform::Linkedin)
            .contains("• Investment Value: $450,000"));
    }

    #[test]
    fn test_twitter_truncates_long_description() {
        let description = "é".repeat(150);
        let posts = compose_posts(&description, &sample_property());
        let tweet = posts.get(SocialPlatform::Twitter);

        let expected = format!("\n\n{}...\n\n", "é".repeat(100));
        assert!(tweet.contains(&expected));
        assert!(!tweet.contains(&"é".repeat(101)));
        assert!(tweet.starts_with("🏠 NEW: 2-Bedroom Condo at 123 Maple Street, Downtown"));
    }

    #[test]
    fn test_twitter_keeps_short_description() {
        let exactly_100 = "a".repeat(100);
        let posts = compose_posts(&exactly_100, &sample_property());
        let tweet = posts.get(SocialPlatform::Twitter);
        assert!(tweet.contains(&format!("\n\n{}\n\n", exactly_100)));
        assert!(!tweet.contains("..."));
    }

    #[test]
    fn test_missing_metadata_defaults() {
        let property = PropertyRecord {
            id: "p".to_string(),
            address: None,
            price: None,
            property_type: None,
            image_urls: vec![],
        };
        let posts = compose_posts("Nice.", &property);

        assert!(posts.get(SocialPlatform::Instagram).contains("📍 New Listing"));
        assert!(posts.get(SocialPlatform::Instagram).contains("#property "));
        assert!(posts.get(SocialPlatform::Facebook).contains("💵 Price: Contact for price"));
        assert!(posts.get(SocialPlatform::Twitter).contains("NEW: Property at New Listing"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
