//! Document store holding the todo collection.
//!
//! A store is opened from a connection string. `memory://` keeps documents
//! in process only; `file://<path>` (or a bare path) additionally rewrites a
//! versioned RON snapshot on every mutation. A mutation is only committed to
//! memory once the snapshot write succeeded.

use std::{
    collections::HashMap,
    fmt, io,
    path::{Path, PathBuf},
};

use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use todos_api::v1::{NewTodo, Todo, TodoPatch, ValidationError};
use tokio::{fs, sync::RwLock};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error("unsupported connection string `{0}`")]
    UnsupportedUrl(String),
    #[error("failed to access `{}`: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to decode `{}`: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("failed to encode todos: {0}")]
    Encode(#[from] ron::Error),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File(PathBuf),
}

impl Backend {
    pub fn parse(url: &str) -> Result<Self, StoreError> {
        let url = url.trim();

        if url == "memory:" || url == "memory://" {
            return Ok(Self::Memory);
        }

        let path = match url.strip_prefix("file://") {
            Some(path) => path,
            None if url.contains("://") => {
                return Err(StoreError::UnsupportedUrl(url.to_owned()));
            }
            None => url,
        };

        if path.is_empty() {
            return Err(StoreError::UnsupportedUrl(url.to_owned()));
        }

        Ok(Self::File(PathBuf::from(path)))
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory://"),
            Self::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// Todos keyed by id, remembering the order they were inserted in.
#[derive(Clone, Debug, Default)]
struct Collection {
    next_seq: u64,
    todos: HashMap<Uuid, (u64, Todo)>,
}

impl Collection {
    fn insert(&mut self, todo: Todo) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.todos.insert(todo.id, (seq, todo));
    }

    fn get(&self, id: &Uuid) -> Option<&Todo> {
        self.todos.get(id).map(|(_, todo)| todo)
    }

    fn get_mut(&mut self, id: &Uuid) -> Option<&mut Todo> {
        self.todos.get_mut(id).map(|(_, todo)| todo)
    }

    fn remove(&mut self, id: &Uuid) -> Option<Todo> {
        self.todos.remove(id).map(|(_, todo)| todo)
    }

    /// Todos in insertion order.
    fn ordered(&self) -> Vec<&Todo> {
        let mut entries: Vec<_> = self.todos.values().collect();
        entries.sort_unstable_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, todo)| todo).collect()
    }
}

impl FromIterator<Todo> for Collection {
    fn from_iter<I: IntoIterator<Item = Todo>>(iter: I) -> Self {
        let mut collection = Self::default();
        for todo in iter {
            collection.insert(todo);
        }
        collection
    }
}

#[derive(Debug)]
pub struct TodoStore {
    backend: Backend,
    todos: RwLock<Collection>,
}

impl TodoStore {
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let backend = Backend::parse(url)?;

        let todos = match &backend {
            Backend::Memory => Collection::default(),
            Backend::File(path) => load(path).await?,
        };

        Ok(Self {
            backend,
            todos: RwLock::new(todos),
        })
    }

    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            todos: RwLock::default(),
        }
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// All todos, in the order they were created.
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos.ordered().into_iter().cloned().collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let todos = self.todos.read().await;
        Ok(todos.get(&id).cloned())
    }

    pub async fn create(&self, new: NewTodo) -> Result<Todo, StoreError> {
        let todo = Todo::create(new)?;

        self.mutate(|todos| {
            todos.insert(todo.clone());
            Ok(Some(()))
        })
        .await?;

        Ok(todo)
    }

    pub async fn update(&self, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        patch.validate()?;

        self.mutate(|todos| {
            let Some(todo) = todos.get_mut(&id) else {
                return Ok(None);
            };

            todo.apply(patch)?;
            Ok(Some(todo.clone()))
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<Option<Todo>, StoreError> {
        self.mutate(|todos| Ok(todos.remove(&id))).await
    }

    /// Applies `f` to the collection. `None` from `f` means nothing changed.
    ///
    /// The file backend works on a copy that replaces the collection only
    /// once the snapshot is written. `f` must not leave partial changes
    /// behind when it fails.
    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Collection) -> Result<Option<T>, StoreError>,
    ) -> Result<Option<T>, StoreError> {
        let mut todos = self.todos.write().await;

        let Backend::File(path) = &self.backend else {
            return f(&mut *todos);
        };

        let mut next = todos.clone();

        let Some(output) = f(&mut next)? else {
            return Ok(None);
        };

        store(path, &next).await?;

        *todos = next;
        Ok(Some(output))
    }
}

#[derive(Serialize)]
enum DataBorrowed<'a> {
    V1 { todos: Vec<&'a Todo> },
}

#[derive(Deserialize)]
enum DataOwned {
    V1 { todos: Vec<Todo> },
}

async fn load(path: &Path) -> Result<Collection, StoreError> {
    let text = match fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Collection::default()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_owned(),
                source,
            })
        }
    };

    let data: DataOwned = ron::de::from_str(&text).map_err(|source| StoreError::Decode {
        path: path.to_owned(),
        source,
    })?;

    match data {
        DataOwned::V1 { todos } => Ok(todos.into_iter().collect()),
    }
}

async fn store(path: &Path, todos: &Collection) -> Result<(), StoreError> {
    let data = DataBorrowed::V1 {
        todos: todos.ordered(),
    };
    let text = ron::ser::to_string_pretty(&data, PrettyConfig::default())?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let io_err = |source| StoreError::Io {
        path: path.to_owned(),
        source,
    };

    fs::write(&tmp, text).await.map_err(io_err)?;

    if let Err(source) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(io_err(source));
    }

    Ok(())
}
