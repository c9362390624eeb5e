use std::sync::Arc;

use almanac_core::{
    datasets::{AcquiredFilter, CrewCriteria, RouteCriteria, NATIONS},
    query::cycle_option,
    AcquiredSet, BoardManager, BoardSort, Category, CharacterGroup, Companion, CrewRoster, Item,
    ItemCatalog, ItemCriteria, Post, PostDraft, Protagonist, RouteTable, SearchTerm, SearchView,
    SortPolicy, SpecialCompanion, TradeRoute,
};

use crate::input::TextInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Items,
    Routes,
    Crew,
    Azizah,
    Board,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Items, Tab::Routes, Tab::Crew, Tab::Azizah, Tab::Board];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Items => "아이템",
            Tab::Routes => "황금항로",
            Tab::Crew => "일반동료",
            Tab::Azizah => "아지자",
            Tab::Board => "게시판",
        }
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Progress of the lazy dataset load behind a tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadStatus {
    /// Whether a load should be started when the tab is shown.
    pub fn needs_load(&self) -> bool {
        matches!(self, LoadStatus::Idle)
    }
}

fn clamp_cursor(cursor: &mut usize, rows: usize) {
    *cursor = (*cursor).min(rows.saturating_sub(1));
}

fn step_cursor(cursor: &mut usize, delta: isize, rows: usize) {
    if rows == 0 {
        *cursor = 0;
        return;
    }
    *cursor = (*cursor as isize + delta).clamp(0, rows as isize - 1) as usize;
}

pub struct ItemsTab {
    pub status: LoadStatus,
    pub catalog: Option<Arc<ItemCatalog>>,
    pub view: Option<SearchView<Item>>,
    pub criteria: ItemCriteria,
    pub positions: Vec<String>,
    pub regions: Vec<String>,
    pub cursor: usize,
    page_size: usize,
}

impl ItemsTab {
    pub fn new(page_size: usize) -> Self {
        Self {
            status: LoadStatus::Idle,
            catalog: None,
            view: None,
            criteria: ItemCriteria::new(),
            positions: Vec::new(),
            regions: Vec::new(),
            cursor: 0,
            page_size,
        }
    }

    pub fn set_catalog(&mut self, catalog: Arc<ItemCatalog>, acquired: &AcquiredSet) {
        self.positions = catalog.positions();
        self.regions = catalog.regions();
        self.view = Some(SearchView::new(catalog.records(), self.page_size));
        self.catalog = Some(catalog);
        self.status = LoadStatus::Ready;
        self.search(acquired);
    }

    pub fn reset(&mut self) {
        self.status = LoadStatus::Idle;
        self.catalog = None;
        self.view = None;
        self.cursor = 0;
    }

    /// New search from the current criteria; back to page 1.
    pub fn search(&mut self, acquired: &AcquiredSet) {
        if let Some(view) = self.view.as_mut() {
            view.apply(
                &self.criteria.with_acquired_set(acquired),
                SortPolicy::EffectDescending,
            );
        }
        self.cursor = 0;
    }

    /// Re-evaluate after acquired marks changed, keeping the page.
    pub fn refilter(&mut self, acquired: &AcquiredSet) {
        if let Some(view) = self.view.as_mut() {
            view.refilter(
                &self.criteria.with_acquired_set(acquired),
                SortPolicy::EffectDescending,
            );
            clamp_cursor(&mut self.cursor, view.page_view().len());
        }
    }

    pub fn set_term(&mut self, term: &str, acquired: &AcquiredSet) {
        self.criteria.set_term(term);
        self.search(acquired);
    }

    pub fn cycle_category(&mut self, acquired: &AcquiredSet) {
        let next = cycle_option(&Category::ALL, self.criteria.category().as_ref());
        self.criteria.set_category(next);
        self.search(acquired);
    }

    /// Returns false when positions do not apply to the selected category.
    pub fn cycle_position(&mut self, acquired: &AcquiredSet) -> bool {
        let current = self.criteria.position().map(str::to_string);
        let next = cycle_option(&self.positions, current.as_ref());
        if !self.criteria.set_position(next) {
            return false;
        }
        self.search(acquired);
        true
    }

    pub fn cycle_region(&mut self, acquired: &AcquiredSet) {
        let current = self.criteria.region().map(str::to_string);
        let next = cycle_option(&self.regions, current.as_ref());
        self.criteria.set_region(next);
        self.search(acquired);
    }

    pub fn cycle_group(&mut self, acquired: &AcquiredSet) {
        let next = cycle_option(&CharacterGroup::ALL, self.criteria.group().as_ref());
        self.criteria.set_group(next);
        self.search(acquired);
    }

    pub fn cycle_protagonist(&mut self, acquired: &AcquiredSet) {
        let next = cycle_option(&Protagonist::ALL, self.criteria.protagonist().as_ref());
        self.criteria.set_protagonist(next);
        self.search(acquired);
    }

    pub fn cycle_acquired(&mut self, acquired: &AcquiredSet) {
        let next = self.criteria.acquired().cycle();
        self.criteria.set_acquired(next);
        self.search(acquired);
    }

    pub fn clear_filters(&mut self, acquired: &AcquiredSet) {
        let term = self.criteria.term().raw().to_string();
        self.criteria = ItemCriteria::new().with_term(&term);
        self.search(acquired);
    }

    pub fn filters_active(&self) -> bool {
        self.criteria.category().is_some()
            || self.criteria.position().is_some()
            || self.criteria.region().is_some()
            || self.criteria.group().is_some()
            || self.criteria.protagonist().is_some()
            || self.criteria.acquired() != AcquiredFilter::All
    }

    pub fn selected(&self) -> Option<&Item> {
        self.view.as_ref()?.row(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if let Some(view) = &self.view {
            step_cursor(&mut self.cursor, delta, view.page_view().len());
        }
    }

    pub fn change_page(&mut self, forward: bool) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let moved = if forward {
            view.next_page()
        } else {
            view.previous_page()
        };
        if moved {
            self.cursor = 0;
        }
        moved
    }

    pub fn go_to_page(&mut self, page: usize) -> bool {
        let moved = self
            .view
            .as_mut()
            .is_some_and(|view| view.go_to_page(page));
        if moved {
            self.cursor = 0;
        }
        moved
    }
}

pub struct RoutesTab {
    pub status: LoadStatus,
    pub table: Option<Arc<RouteTable>>,
    pub view: Option<SearchView<TradeRoute>>,
    pub criteria: RouteCriteria,
    pub regions: Vec<String>,
    pub cities: Vec<String>,
    pub kinds: Vec<String>,
    pub commodities: Vec<String>,
    pub cursor: usize,
    /// First nation column shown in the price table.
    pub nation_offset: usize,
    page_size: usize,
}

impl RoutesTab {
    pub fn new(page_size: usize) -> Self {
        Self {
            status: LoadStatus::Idle,
            table: None,
            view: None,
            criteria: RouteCriteria::new(),
            regions: Vec::new(),
            cities: Vec::new(),
            kinds: Vec::new(),
            commodities: Vec::new(),
            cursor: 0,
            nation_offset: 0,
            page_size,
        }
    }

    pub fn set_table(&mut self, table: Arc<RouteTable>) {
        self.regions = table.regions();
        self.cities = table.cities();
        self.kinds = table.kinds();
        self.commodities = table.commodities();
        self.view = Some(SearchView::new(table.records(), self.page_size));
        self.table = Some(table);
        self.status = LoadStatus::Ready;
        self.search();
    }

    pub fn reset(&mut self) {
        self.status = LoadStatus::Idle;
        self.table = None;
        self.view = None;
        self.cursor = 0;
    }

    pub fn search(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.apply(&self.criteria, SortPolicy::Original);
        }
        self.cursor = 0;
    }

    pub fn set_term(&mut self, term: &str) {
        self.criteria.term = SearchTerm::new(term);
        self.search();
    }

    pub fn cycle_region(&mut self) {
        self.criteria.region = cycle_option(&self.regions, self.criteria.region.as_ref());
        self.search();
    }

    pub fn cycle_city(&mut self) {
        self.criteria.city = cycle_option(&self.cities, self.criteria.city.as_ref());
        self.search();
    }

    pub fn cycle_kind(&mut self) {
        self.criteria.kind = cycle_option(&self.kinds, self.criteria.kind.as_ref());
        self.search();
    }

    pub fn cycle_commodity(&mut self) {
        self.criteria.commodity =
            cycle_option(&self.commodities, self.criteria.commodity.as_ref());
        self.search();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = RouteCriteria {
            term: self.criteria.term.clone(),
            ..RouteCriteria::new()
        };
        self.search();
    }

    pub fn scroll_nations(&mut self, delta: isize) {
        let max = NATIONS.len().saturating_sub(1) as isize;
        self.nation_offset = (self.nation_offset as isize + delta).clamp(0, max) as usize;
    }

    pub fn selected(&self) -> Option<&TradeRoute> {
        self.view.as_ref()?.row(self.cursor)
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if let Some(view) = &self.view {
            step_cursor(&mut self.cursor, delta, view.page_view().len());
        }
    }

    pub fn change_page(&mut self, forward: bool) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let moved = if forward {
            view.next_page()
        } else {
            view.previous_page()
        };
        if moved {
            self.cursor = 0;
        }
        moved
    }
}

pub struct CrewTab {
    pub status: LoadStatus,
    pub view: Option<SearchView<Companion>>,
    pub criteria: CrewCriteria,
    pub characters: Vec<String>,
    pub cursor: usize,
    page_size: usize,
}

impl CrewTab {
    pub fn new(page_size: usize) -> Self {
        Self {
            status: LoadStatus::Idle,
            view: None,
            criteria: CrewCriteria::new(),
            characters: Vec::new(),
            cursor: 0,
            page_size,
        }
    }

    pub fn set_roster(&mut self, roster: Arc<CrewRoster>) {
        self.characters = roster.characters();
        self.view = Some(SearchView::new(roster.records(), self.page_size));
        self.status = LoadStatus::Ready;
        self.search();
    }

    pub fn reset(&mut self) {
        self.status = LoadStatus::Idle;
        self.view = None;
        self.cursor = 0;
    }

    pub fn search(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.apply(&self.criteria, SortPolicy::Original);
        }
        self.cursor = 0;
    }

    pub fn set_term(&mut self, term: &str) {
        self.criteria.term = SearchTerm::new(term);
        self.search();
    }

    pub fn cycle_character(&mut self) {
        self.criteria.character =
            cycle_option(&self.characters, self.criteria.character.as_ref());
        self.search();
    }

    pub fn clear_filters(&mut self) {
        self.criteria.character = None;
        self.search();
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if let Some(view) = &self.view {
            step_cursor(&mut self.cursor, delta, view.page_view().len());
        }
    }

    pub fn change_page(&mut self, forward: bool) -> bool {
        let Some(view) = self.view.as_mut() else {
            return false;
        };
        let moved = if forward {
            view.next_page()
        } else {
            view.previous_page()
        };
        if moved {
            self.cursor = 0;
        }
        moved
    }
}

#[derive(Default)]
pub struct AzizahTab {
    pub status: LoadStatus,
    pub guide: Option<Arc<SpecialCompanion>>,
    pub scroll: u16,
}

impl AzizahTab {
    pub fn set_guide(&mut self, guide: Arc<SpecialCompanion>) {
        self.guide = Some(guide);
        self.status = LoadStatus::Ready;
        self.scroll = 0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn scroll_by(&mut self, delta: i32) {
        self.scroll = (i32::from(self.scroll) + delta).clamp(0, i32::from(u16::MAX)) as u16;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Author,
    Content,
}

impl FormField {
    pub const ALL: [FormField; 3] = [FormField::Title, FormField::Author, FormField::Content];

    pub fn label(self) -> &'static str {
        match self {
            FormField::Title => "제목",
            FormField::Author => "작성자",
            FormField::Content => "내용",
        }
    }
}

/// Write or edit form of the board.
#[derive(Debug, Clone)]
pub struct PostForm {
    pub editing: Option<u64>,
    pub title: TextInput,
    pub author: TextInput,
    pub content: TextInput,
    pub focus: FormField,
}

impl PostForm {
    pub fn new(author: &str) -> Self {
        Self {
            editing: None,
            title: TextInput::default(),
            author: TextInput::with_value(author),
            content: TextInput::default(),
            focus: FormField::Title,
        }
    }

    pub fn edit(post: &Post) -> Self {
        Self {
            editing: Some(post.id),
            title: TextInput::with_value(&post.title),
            author: TextInput::with_value(&post.author),
            content: TextInput::with_value(&post.content),
            focus: FormField::Title,
        }
    }

    pub fn field(&self, field: FormField) -> &TextInput {
        match field {
            FormField::Title => &self.title,
            FormField::Author => &self.author,
            FormField::Content => &self.content,
        }
    }

    pub fn focused_mut(&mut self) -> &mut TextInput {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Author => &mut self.author,
            FormField::Content => &mut self.content,
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) {
        let idx = FormField::ALL
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0);
        let len = FormField::ALL.len();
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        self.focus = FormField::ALL[next];
    }

    pub fn draft(&self) -> PostDraft {
        PostDraft::new(self.title.value(), self.author.value(), self.content.value())
    }
}

pub struct BoardTab {
    pub term: SearchTerm,
    pub sort: BoardSort,
    pub cursor: usize,
    /// Name used to authorise edits and deletes.
    pub author: TextInput,
    pub form: Option<PostForm>,
    pub confirm_delete: Option<u64>,
}

impl Default for BoardTab {
    fn default() -> Self {
        Self {
            term: SearchTerm::default(),
            sort: BoardSort::Latest,
            cursor: 0,
            author: TextInput::default(),
            form: None,
            confirm_delete: None,
        }
    }
}

impl BoardTab {
    pub fn visible<'a>(&self, board: &'a BoardManager) -> Vec<&'a Post> {
        board.view(&self.term, self.sort)
    }

    pub fn selected<'a>(&self, board: &'a BoardManager) -> Option<&'a Post> {
        self.visible(board).get(self.cursor).copied()
    }

    pub fn set_term(&mut self, term: &str) {
        self.term = SearchTerm::new(term);
        self.cursor = 0;
    }

    pub fn cycle_sort(&mut self) {
        self.sort = self.sort.cycle();
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize, board: &BoardManager) {
        let rows = self.visible(board).len();
        step_cursor(&mut self.cursor, delta, rows);
    }

    pub fn clamp(&mut self, board: &BoardManager) {
        let rows = self.visible(board).len();
        clamp_cursor(&mut self.cursor, rows);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{KeyValueStore, MemoryStore};

    fn catalog() -> Arc<ItemCatalog> {
        let doc = r#"[
            {"인덱스": "item_w_001", "이름": "단검", "효과": 5, "지역": "북해"},
            {"인덱스": "item_w_002", "이름": "장검", "효과": 30, "지역": "북해"},
            {"인덱스": "item_e_001", "이름": "망원경", "보직": "항해사", "지역": "지중해"}
        ]"#;
        Arc::new(ItemCatalog::from_slice(doc.as_bytes()).expect("catalog parses"))
    }

    #[test]
    fn tabs_wrap_around() {
        assert_eq!(Tab::Items.previous(), Tab::Board);
        assert_eq!(Tab::Board.next(), Tab::Items);
        assert_eq!(Tab::Routes.index(), 1);
    }

    #[test]
    fn items_tab_ranks_and_filters() {
        let acquired = AcquiredSet::default();
        let mut tab = ItemsTab::new(20);
        tab.set_catalog(catalog(), &acquired);
        assert_eq!(tab.selected().map(|item| item.key.as_str()), Some("item_w_002"));

        assert!(!tab.cycle_position(&acquired));
        tab.cycle_category(&acquired);
        tab.cycle_category(&acquired);
        tab.cycle_category(&acquired);
        assert_eq!(tab.criteria.category(), Some(Category::Equipment));
        assert!(tab.cycle_position(&acquired));
        assert_eq!(tab.view.as_ref().map(|v| v.filtered_len()), Some(1));

        tab.clear_filters(&acquired);
        assert!(!tab.filters_active());
        tab.move_cursor(10);
        assert_eq!(tab.cursor, 2);
    }

    #[test]
    fn refilter_keeps_cursor_in_range() {
        let mut acquired = AcquiredSet::default();
        let mut tab = ItemsTab::new(20);
        tab.set_catalog(catalog(), &acquired);
        tab.cycle_acquired(&acquired);
        tab.cycle_acquired(&acquired);
        assert_eq!(tab.criteria.acquired(), AcquiredFilter::NotAcquired);
        tab.move_cursor(2);
        acquired.toggle("item_e_001");
        tab.refilter(&acquired);
        assert_eq!(tab.cursor, 1);
    }

    #[test]
    fn board_form_builds_drafts() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let mut board = BoardManager::load(store);
        let mut form = PostForm::new("릴");
        form.title = TextInput::with_value("안녕");
        form.cycle_focus(true);
        form.cycle_focus(true);
        form.focused_mut().insert('!');
        assert_eq!(form.focus, FormField::Content);
        let post = board.add_post(&form.draft()).expect("valid draft").clone();
        assert_eq!(post.content, "!");

        let mut tab = BoardTab::default();
        assert_eq!(tab.selected(&board).map(|p| p.id), Some(post.id));
        tab.set_term("없는 글");
        assert!(tab.selected(&board).is_none());
        tab.move_cursor(1, &board);
        assert_eq!(tab.cursor, 0);
    }
}
