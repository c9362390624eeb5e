//! Local bulletin board.
//!
//! Posts, the next-id counter and the developer-mode flag live in the
//! key-value store. Every mutation is written through before it becomes
//! visible, so a failed write leaves the board as it was.

use std::{cmp::Ordering, sync::Arc};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::{BoardError, StoreError},
    query::SearchTerm,
    store::{
        read_json, write_json, KeyValueStore, BOARD_DEVELOPER_MODE_KEY, BOARD_NEXT_ID_KEY,
        BOARD_POSTS_KEY,
    },
};

/// A board post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique id assigned on creation.
    pub id: u64,
    /// Title.
    pub title: String,
    /// Author name as typed.
    pub author: String,
    /// Body text.
    pub content: String,
    /// Creation time, refreshed on edit.
    pub date: DateTime<Utc>,
    /// View counter.
    #[serde(default)]
    pub views: u64,
}

impl Post {
    fn matches(&self, term: &SearchTerm) -> bool {
        term.matches_any([
            self.title.as_str(),
            self.content.as_str(),
            self.author.as_str(),
        ])
    }
}

/// User input for a new or edited post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    /// Title.
    pub title: String,
    /// Author name.
    pub author: String,
    /// Body text.
    pub content: String,
}

impl PostDraft {
    /// Draft from the three form fields.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            content: content.into(),
        }
    }

    fn validated(&self) -> Result<(String, String, String), BoardError> {
        let field = |value: &str, name: &'static str| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(BoardError::EmptyField(name))
            } else {
                Ok(trimmed.to_string())
            }
        };
        Ok((
            field(&self.title, "title")?,
            field(&self.author, "author")?,
            field(&self.content, "content")?,
        ))
    }
}

/// Display order of the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BoardSort {
    /// Newest first.
    #[default]
    Latest,
    /// Oldest first.
    Oldest,
    /// Alphabetical by title.
    Title,
}

impl BoardSort {
    /// Next option for a cycling selector.
    pub fn cycle(self) -> Self {
        match self {
            BoardSort::Latest => BoardSort::Oldest,
            BoardSort::Oldest => BoardSort::Title,
            BoardSort::Title => BoardSort::Latest,
        }
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            BoardSort::Latest => "latest",
            BoardSort::Oldest => "oldest",
            BoardSort::Title => "title",
        }
    }

    fn compare(self, a: &Post, b: &Post) -> Ordering {
        match self {
            BoardSort::Latest => b.date.cmp(&a.date),
            BoardSort::Oldest => a.date.cmp(&b.date),
            BoardSort::Title => a.title.cmp(&b.title),
        }
    }
}

/// Owns the board state and its persistence.
pub struct BoardManager {
    store: Arc<dyn KeyValueStore>,
    posts: Vec<Post>,
    next_id: u64,
    developer_mode: bool,
}

impl BoardManager {
    /// Read the board from `store`. Unreadable values are logged and reset.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let posts = match read_json::<Vec<Post>>(store.as_ref(), BOARD_POSTS_KEY) {
            Ok(posts) => posts.unwrap_or_default(),
            Err(err) => {
                warn!(%err, "discarding unreadable board posts");
                Vec::new()
            }
        };
        let next_id = read_text(store.as_ref(), BOARD_NEXT_ID_KEY)
            .and_then(|text| text.trim().parse::<u64>().ok())
            .filter(|id| *id > 0)
            .unwrap_or(1)
            .max(posts.iter().map(|post| post.id + 1).max().unwrap_or(1));
        let developer_mode =
            read_text(store.as_ref(), BOARD_DEVELOPER_MODE_KEY).as_deref() == Some("true");

        Self {
            store,
            posts,
            next_id,
            developer_mode,
        }
    }

    /// All posts, newest first.
    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    /// Post with `id`.
    pub fn get(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Whether developer mode is on.
    pub fn developer_mode(&self) -> bool {
        self.developer_mode
    }

    /// Id the next post will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Whether `acting_author` may edit or delete `post`.
    pub fn can_modify(&self, post: &Post, acting_author: &str) -> bool {
        if self.developer_mode {
            return true;
        }
        let acting = acting_author.trim();
        !acting.is_empty() && acting == post.author
    }

    /// Publish a new post at the top of the board.
    pub fn add_post(&mut self, draft: &PostDraft) -> Result<&Post, BoardError> {
        let (title, author, content) = draft.validated()?;
        let post = Post {
            id: self.next_id,
            title,
            author,
            content,
            date: Utc::now(),
            views: 0,
        };
        let mut posts = self.posts.clone();
        posts.insert(0, post);
        let next_id = self.next_id + 1;

        self.persist(&posts, next_id)?;
        self.posts = posts;
        self.next_id = next_id;
        info!(id = next_id - 1, "added board post");
        Ok(&self.posts[0])
    }

    /// Replace the fields of post `id` and refresh its date.
    pub fn update_post(
        &mut self,
        id: u64,
        acting_author: &str,
        draft: &PostDraft,
    ) -> Result<&Post, BoardError> {
        let idx = self.authorized_index(id, acting_author)?;
        let (title, author, content) = draft.validated()?;

        let mut posts = self.posts.clone();
        let post = &mut posts[idx];
        post.title = title;
        post.author = author;
        post.content = content;
        post.date = Utc::now();

        self.persist(&posts, self.next_id)?;
        self.posts = posts;
        info!(id, "updated board post");
        Ok(&self.posts[idx])
    }

    /// Remove post `id`.
    pub fn delete_post(&mut self, id: u64, acting_author: &str) -> Result<Post, BoardError> {
        let idx = self.authorized_index(id, acting_author)?;
        let mut posts = self.posts.clone();
        let removed = posts.remove(idx);

        self.persist(&posts, self.next_id)?;
        self.posts = posts;
        info!(id, "deleted board post");
        Ok(removed)
    }

    /// Increment the view counter of post `id`.
    pub fn record_view(&mut self, id: u64) -> Result<u64, BoardError> {
        let idx = self.index_of(id)?;
        let mut posts = self.posts.clone();
        posts[idx].views += 1;
        let views = posts[idx].views;

        self.persist(&posts, self.next_id)?;
        self.posts = posts;
        Ok(views)
    }

    /// Posts whose title, content or author contain `term`.
    pub fn search(&self, term: &SearchTerm) -> Vec<&Post> {
        self.posts.iter().filter(|post| post.matches(term)).collect()
    }

    /// Matching posts in `sort` order. Stable for equal keys.
    pub fn view(&self, term: &SearchTerm, sort: BoardSort) -> Vec<&Post> {
        let mut posts = self.search(term);
        posts.sort_by(|a, b| sort.compare(a, b));
        posts
    }

    /// Turn developer mode on or off and persist the flag.
    pub fn set_developer_mode(&mut self, enabled: bool) -> Result<(), BoardError> {
        self.store
            .set(BOARD_DEVELOPER_MODE_KEY, if enabled { "true" } else { "false" })?;
        self.developer_mode = enabled;
        info!(enabled, "board developer mode changed");
        Ok(())
    }

    /// Flip developer mode and return the new state.
    pub fn toggle_developer_mode(&mut self) -> Result<bool, BoardError> {
        self.set_developer_mode(!self.developer_mode)?;
        Ok(self.developer_mode)
    }

    fn index_of(&self, id: u64) -> Result<usize, BoardError> {
        self.posts
            .iter()
            .position(|post| post.id == id)
            .ok_or(BoardError::NotFound(id))
    }

    fn authorized_index(&self, id: u64, acting_author: &str) -> Result<usize, BoardError> {
        let idx = self.index_of(id)?;
        if !self.can_modify(&self.posts[idx], acting_author) {
            return Err(BoardError::Forbidden(id));
        }
        Ok(idx)
    }

    fn persist(&self, posts: &[Post], next_id: u64) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), BOARD_POSTS_KEY, posts)?;
        self.store.set(BOARD_NEXT_ID_KEY, &next_id.to_string())
    }
}

fn read_text(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            warn!(key, %err, "failed to read board setting");
            None
        }
    }
}
