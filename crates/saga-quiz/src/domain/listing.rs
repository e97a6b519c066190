//! Character listing: platform page sizes, admin sort orders, and offset
//! pagination.

use super::character::Character;

/// Client platform, which decides how many characters one request returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Desktop browsers.
    Desktop,
    /// Phones.
    Mobile,
}

impl Platform {
    /// Parses a platform name case-insensitively. Anything other than
    /// `mobile` is treated as desktop.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("mobile") {
            Self::Mobile
        } else {
            Self::Desktop
        }
    }

    /// Maximum number of characters returned per request.
    #[must_use]
    pub fn page_limit(self) -> usize {
        match self {
            Self::Desktop => 10,
            Self::Mobile => 8,
        }
    }

    /// Number of characters shown per page by the front-end.
    #[must_use]
    pub fn cards_per_page(self) -> usize {
        match self {
            Self::Desktop => 5,
            Self::Mobile => 4,
        }
    }
}

/// Admin listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Storage order (upload order).
    Oldest,
    /// Reverse storage order.
    Newest,
    /// Name A-Z, case-insensitive.
    NameAsc,
    /// Name Z-A, case-insensitive.
    NameDesc,
}

impl SortOrder {
    /// Parses a sort key. Unknown keys fall back to `Oldest`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "newest" => Self::Newest,
            "name_asc" => Self::NameAsc,
            "name_desc" => Self::NameDesc,
            _ => Self::Oldest,
        }
    }

    /// Sorts `characters` in place. Name sorts are stable.
    pub fn apply(self, characters: &mut [Character]) {
        match self {
            Self::Oldest => {}
            Self::Newest => characters.reverse(),
            Self::NameAsc => characters.sort_by_cached_key(|c| c.name.to_lowercase()),
            Self::NameDesc => {
                characters.sort_by_cached_key(|c| std::cmp::Reverse(c.name.to_lowercase()));
            }
        }
    }
}

/// One window of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items in the window.
    pub items: Vec<T>,
    /// Size of the full listing before slicing.
    pub total: usize,
    /// Number of items actually returned.
    pub limit: usize,
    /// Offset the window starts at.
    pub offset: usize,
}

/// Slices `[offset, offset + min(limit, total - offset))` out of `items`.
/// An offset at or past the end yields an empty page with limit 0.
#[must_use]
pub fn paginate<T>(items: Vec<T>, offset: usize, limit: usize) -> Page<T> {
    let total = items.len();
    let actual = limit.min(total.saturating_sub(offset));
    let window = items.into_iter().skip(offset).take(actual).collect();
    Page {
        items: window,
        total,
        limit: actual,
        offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::character::Visibility;

    fn named(id: u32, name: &str) -> Character {
        Character {
            id,
            name: name.to_owned(),
            original_image: String::new(),
            folder: String::new(),
            owner: "public".to_owned(),
            status: Visibility::Public,
        }
    }

    #[test]
    fn test_platform_parse_is_case_insensitive_and_defaults_to_desktop() {
        assert_eq!(Platform::parse("MOBILE"), Platform::Mobile);
        assert_eq!(Platform::parse("tablet"), Platform::Desktop);
        assert_eq!(Platform::Mobile.page_limit(), 8);
        assert_eq!(Platform::Desktop.page_limit(), 10);
    }

    #[test]
    fn test_paginate_returns_remaining_items_on_last_page() {
        // Arrange
        let items: Vec<u32> = (0..13).collect();

        // Act
        let page = paginate(items, 10, 10);

        // Assert
        assert_eq!(page.items, vec![10, 11, 12]);
        assert_eq!(page.total, 13);
        assert_eq!(page.limit, 3);
        assert_eq!(page.offset, 10);
    }

    #[test]
    fn test_paginate_past_end_is_empty_with_zero_limit() {
        let page = paginate(vec![1, 2, 3], 5, 10);

        assert!(page.items.is_empty());
        assert_eq!(page.limit, 0);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut characters = vec![named(1, "bravo"), named(2, "Alpha"), named(3, "charlie")];

        SortOrder::NameAsc.apply(&mut characters);
        let asc: Vec<u32> = characters.iter().map(|c| c.id).collect();
        SortOrder::NameDesc.apply(&mut characters);
        let desc: Vec<u32> = characters.iter().map(|c| c.id).collect();

        assert_eq!(asc, vec![2, 1, 3]);
        assert_eq!(desc, vec![3, 1, 2]);
    }

    #[test]
    fn test_newest_reverses_and_unknown_sort_keeps_order() {
        let mut characters = vec![named(1, "a"), named(2, "b"), named(3, "c")];

        SortOrder::parse("bogus").apply(&mut characters);
        assert_eq!(characters[0].id, 1);

        SortOrder::parse("newest").apply(&mut characters);
        assert_eq!(characters[0].id, 3);
    }
}
