use std::sync::Arc;

use almanac_core::{
    datasets::AcquiredFilter,
    loader::LoadOptions,
    AcquiredTracker, Category, DataSource, DatasetLoader, Highlighter, ItemCatalog, ItemCriteria,
    KeyValueStore, MemoryStore, SearchTerm, SearchView, SortPolicy,
};
use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// 100 records: 10 weapons with scattered effects, the rest supplies.
fn catalog_document() -> Value {
    let items: Vec<Value> = (0..100)
        .map(|n| {
            if n % 10 == 3 {
                let effect = (n * 37) % 101;
                let effect = if n % 20 == 3 {
                    json!(effect)
                } else {
                    json!(format!("공격력 +{effect}"))
                };
                json!({
                    "인덱스": format!("item_w_{n:03}"),
                    "이름": format!("무기 {n}"),
                    "효과": effect,
                    "지역": {"구 캐릭터": "북해", "신 캐릭터": null},
                })
            } else {
                json!({
                    "인덱스": format!("item_c_{n:03}"),
                    "이름": format!("항해용품 {n}"),
                    "효과": 999,
                    "지역": "지중해",
                })
            }
        })
        .collect();
    Value::Array(items)
}

async fn load_catalog() -> Result<(tempfile::TempDir, Arc<ItemCatalog>)> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("dh4_ver4.json"),
        serde_json::to_vec(&catalog_document())?,
    )?;
    let loader = DatasetLoader::new(
        DataSource::Directory(dir.path().to_path_buf()),
        LoadOptions::default(),
    );
    let catalog = loader.load::<ItemCatalog>().await?;
    Ok((dir, catalog))
}

#[tokio::test]
async fn weapons_ranked_on_a_single_page() -> Result<()> {
    let (_dir, catalog) = load_catalog().await?;
    assert_eq!(catalog.len(), 100);

    let tracker = AcquiredTracker::load(Arc::new(MemoryStore::new()));
    let criteria = ItemCriteria::new().with_category(Some(Category::Weapon));
    let mut view = SearchView::new(catalog.records(), 20);
    view.apply(
        &criteria.with_acquired_set(tracker.set()),
        SortPolicy::EffectDescending,
    );

    let page = view.page();
    assert_eq!(page.view.total_pages, 1);
    assert_eq!(page.items.len(), 10);
    let effects: Vec<f64> = page.items.iter().map(|item| item.effect_value()).collect();
    let max = effects.iter().copied().fold(f64::MIN, f64::max);
    assert_eq!(effects[0], max);
    assert!(effects.windows(2).all(|pair| pair[0] >= pair[1]));
    assert_eq!(catalog.items()[3].key, "item_w_003");
    Ok(())
}

#[tokio::test]
async fn acquired_marks_survive_refiltering() -> Result<()> {
    let (_dir, catalog) = load_catalog().await?;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let mut tracker = AcquiredTracker::load(Arc::clone(&store));

    for key in ["item_w_013", "item_c_000", "item_c_001"] {
        tracker.toggle(&catalog, key)?;
    }
    let progress = tracker.progress(&catalog);
    assert_eq!((progress.acquired, progress.total, progress.percent), (3, 100, 3));

    let mut criteria = ItemCriteria::new().with_acquired(AcquiredFilter::Acquired);
    let mut view = SearchView::new(catalog.records(), 20);
    view.apply(&criteria.with_acquired_set(tracker.set()), SortPolicy::Original);
    assert_eq!(view.filtered_len(), 3);

    criteria.set_term("항해용품");
    view.apply(&criteria.with_acquired_set(tracker.set()), SortPolicy::Original);
    assert_eq!(view.filtered_len(), 2);
    assert!(tracker.is_acquired("item_w_013"));

    let reloaded = AcquiredTracker::load(store);
    assert_eq!(reloaded.set(), tracker.set());
    Ok(())
}

#[tokio::test]
async fn page_rows_highlight_the_term() -> Result<()> {
    let (_dir, catalog) = load_catalog().await?;
    let tracker = AcquiredTracker::load(Arc::new(MemoryStore::new()));
    let criteria = ItemCriteria::new().with_term("무기 4");
    let mut view = SearchView::new(catalog.records(), 20);
    view.apply(&criteria.with_acquired_set(tracker.set()), SortPolicy::Original);

    let page = view.page();
    assert_eq!(page.items.len(), 1);
    let highlighter = Highlighter::new(page.term);
    let marked: Vec<(&str, bool)> = highlighter
        .segments(page.items[0].display_name())
        .into_iter()
        .map(|segment| (segment.text, segment.matched))
        .collect();
    assert_eq!(marked, vec![("무기 4", true), ("3", false)]);
    assert_eq!(page.term, &SearchTerm::new("무기 4"));
    Ok(())
}
