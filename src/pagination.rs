/// One slot in a pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Pages to show around `current`.
///
/// First and last pages are always present, plus `siblings` pages on each
/// side of `current`. A gap of a single page shows that page instead of an
/// ellipsis, since the ellipsis would take the same room.
pub fn page_window(current: u32, total_pages: u32, siblings: u32) -> Vec<PageItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current.clamp(1, total_pages);
    let start = current.saturating_sub(siblings).max(1);
    let end = current.saturating_add(siblings).min(total_pages);

    let mut pages = vec![1];
    pages.extend(start..=end);
    pages.push(total_pages);
    pages.sort_unstable();
    pages.dedup();

    let mut items = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<u32> = None;
    for page in pages {
        if let Some(prev) = previous {
            match page - prev {
                1 => {}
                2 => items.push(PageItem::Page(prev + 1)),
                _ => items.push(PageItem::Ellipsis),
            }
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}
