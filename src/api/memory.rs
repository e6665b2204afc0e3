//! In-process remote store.
//!
//! Backs the test suite and doubles as a reference implementation of the
//! store contract: opaque sequential ids, parent links, duplicate sibling
//! names permitted, conjunctive filters with ordering and limit. Every
//! trait call is counted so callers can assert how many remote round trips
//! an operation issued.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{DriveError, Result};
use crate::fs::NodeKind;

use super::client::StoreErrorCode;
use super::store::{ListFilter, RemoteEntry, RemoteStore, SortOrder, UpdatePatch};

/// Number of calls issued per store method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub get: u64,
    pub list: u64,
    pub create: u64,
    pub update: u64,
    pub delete: u64,
    pub copy: u64,
    pub download: u64,
}

impl CallCounts {
    /// Total calls across all methods.
    pub fn total(&self) -> u64 {
        self.get + self.list + self.create + self.update + self.delete + self.copy + self.download
    }
}

#[derive(Debug, Clone)]
struct StoredObject {
    name: String,
    kind: NodeKind,
    parent: Option<String>,
    content: Vec<u8>,
    created_at: i64,
    modified_at: i64,
}

#[derive(Debug)]
struct Inner {
    objects: HashMap<String, StoredObject>,
    next_id: u64,
    clock: i64,
    calls: CallCounts,
    deny: Option<StoreErrorCode>,
}

/// In-memory [`RemoteStore`] implementation.
#[derive(Debug)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create a store containing a single root folder with the given id.
    pub fn with_root(root_id: &str) -> Self {
        let mut objects = HashMap::new();
        objects.insert(
            root_id.to_string(),
            StoredObject {
                name: String::new(),
                kind: NodeKind::Folder,
                parent: None,
                content: Vec::new(),
                created_at: 0,
                modified_at: 0,
            },
        );
        Self {
            inner: Mutex::new(Inner {
                objects,
                next_id: 1,
                clock: 0,
                calls: CallCounts::default(),
                deny: None,
            }),
        }
    }

    /// Snapshot of the per-method call counters.
    pub fn calls(&self) -> CallCounts {
        self.inner.lock().unwrap().calls
    }

    /// Seed a folder without counting a call. Returns the new id.
    pub fn seed_folder(&self, parent_id: &str, name: &str) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.insert_object(parent_id, name, NodeKind::Folder, Vec::new(), None)
    }

    /// Seed a file without counting a call. Returns the new id.
    pub fn seed_file(&self, parent_id: &str, name: &str, content: &[u8]) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.insert_object(parent_id, name, NodeKind::File, content.to_vec(), None)
    }

    /// Seed a file with an explicit modification stamp.
    pub fn seed_file_at(&self, parent_id: &str, name: &str, content: &[u8], mtime: i64) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.insert_object(parent_id, name, NodeKind::File, content.to_vec(), Some(mtime))
    }

    /// Make every subsequent call fail with the given wire error code.
    /// Calls are still counted.
    pub fn deny_with(&self, code: StoreErrorCode) {
        self.inner.lock().unwrap().deny = Some(code);
    }

    /// Clear a previously injected failure.
    pub fn allow(&self) {
        self.inner.lock().unwrap().deny = None;
    }

    fn not_exist() -> DriveError {
        DriveError::Api {
            code: StoreErrorCode::NotExist as i32,
            message: StoreErrorCode::NotExist.description().to_string(),
        }
    }
}

impl Inner {
    fn denied(&self) -> Result<()> {
        match self.deny {
            Some(code) => Err(DriveError::Api {
                code: code as i32,
                message: code.description().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        self.clock
    }

    fn alloc_id(&mut self) -> String {
        let id = format!("obj{}", self.next_id);
        self.next_id += 1;
        id
    }

    fn insert_object(
        &mut self,
        parent_id: &str,
        name: &str,
        kind: NodeKind,
        content: Vec<u8>,
        mtime: Option<i64>,
    ) -> String {
        let stamp = mtime.unwrap_or_else(|| self.tick());
        let id = self.alloc_id();
        self.objects.insert(
            id.clone(),
            StoredObject {
                name: name.to_string(),
                kind,
                parent: Some(parent_id.to_string()),
                content,
                created_at: stamp,
                modified_at: stamp,
            },
        );
        id
    }

    fn entry(&self, id: &str) -> Option<RemoteEntry> {
        self.objects.get(id).map(|o| RemoteEntry {
            id: id.to_string(),
            name: o.name.clone(),
            kind: o.kind,
            size: if o.kind == NodeKind::File {
                o.content.len() as u64
            } else {
                0
            },
            created_at: Some(o.created_at),
            modified_at: Some(o.modified_at),
        })
    }

    fn matches(&self, entry: &RemoteEntry, filter: &ListFilter) -> bool {
        if let Some(name) = &filter.name_exact {
            if &entry.name != name {
                return false;
            }
        }
        if let Some(sub) = &filter.name_contains {
            if !entry.name.contains(sub.as_str()) {
                return false;
            }
        }
        if let Some(kind) = filter.kind {
            if entry.kind != kind {
                return false;
            }
        }
        if let Some(min) = filter.min_size {
            if entry.size < min {
                return false;
            }
        }
        if let Some(max) = filter.max_size {
            if entry.size > max {
                return false;
            }
        }
        if let Some(after) = filter.modified_after {
            if entry.modified_at.map_or(true, |m| m < after) {
                return false;
            }
        }
        if let Some(before) = filter.modified_before {
            if entry.modified_at.map_or(true, |m| m > before) {
                return false;
            }
        }
        true
    }

    fn remove_subtree(&mut self, id: &str) {
        let children: Vec<String> = self
            .objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(id))
            .map(|(cid, _)| cid.clone())
            .collect();
        for child in children {
            self.remove_subtree(&child);
        }
        self.objects.remove(id);
    }

    fn copy_subtree(&mut self, id: &str, dest_parent: &str, new_name: &str) -> Option<String> {
        let source = self.objects.get(id)?.clone();
        let stamp = self.tick();
        let new_id = self.alloc_id();
        self.objects.insert(
            new_id.clone(),
            StoredObject {
                name: new_name.to_string(),
                kind: source.kind,
                parent: Some(dest_parent.to_string()),
                content: source.content.clone(),
                created_at: stamp,
                modified_at: stamp,
            },
        );
        let children: Vec<(String, String)> = self
            .objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(id))
            .map(|(cid, o)| (cid.clone(), o.name.clone()))
            .collect();
        for (child_id, child_name) in children {
            self.copy_subtree(&child_id, &new_id, &child_name);
        }
        Some(new_id)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<RemoteEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.get += 1;
        inner.denied()?;
        inner.entry(id).ok_or_else(Self::not_exist)
    }

    async fn list(&self, parent_id: &str, filter: Option<&ListFilter>) -> Result<Vec<RemoteEntry>> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.list += 1;
        inner.denied()?;
        if !inner.objects.contains_key(parent_id) {
            return Err(Self::not_exist());
        }

        let mut entries: Vec<RemoteEntry> = inner
            .objects
            .iter()
            .filter(|(_, o)| o.parent.as_deref() == Some(parent_id))
            .filter_map(|(id, _)| inner.entry(id))
            .collect();

        let order = filter.map(|f| f.order).unwrap_or_default();
        if let Some(filter) = filter {
            entries.retain(|e| inner.matches(e, filter));
        }
        match order {
            SortOrder::ModifiedDesc => {
                entries.sort_by(|a, b| b.modified_at.cmp(&a.modified_at).then(a.name.cmp(&b.name)))
            }
            SortOrder::ModifiedAsc => {
                entries.sort_by(|a, b| a.modified_at.cmp(&b.modified_at).then(a.name.cmp(&b.name)))
            }
            SortOrder::NameAsc => entries.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        if let Some(limit) = filter.and_then(|f| f.limit) {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    async fn create(
        &self,
        parent_id: &str,
        name: &str,
        kind: NodeKind,
        content: Option<Vec<u8>>,
    ) -> Result<RemoteEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.create += 1;
        inner.denied()?;
        if inner
            .objects
            .get(parent_id)
            .map_or(true, |o| o.kind != NodeKind::Folder)
        {
            return Err(Self::not_exist());
        }
        let id = inner.insert_object(parent_id, name, kind, content.unwrap_or_default(), None);
        inner.entry(&id).ok_or(DriveError::InvalidResponse)
    }

    async fn update(&self, id: &str, patch: &UpdatePatch) -> Result<RemoteEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.update += 1;
        inner.denied()?;
        let stamp = inner.tick();
        let Some(object) = inner.objects.get_mut(id) else {
            return Err(Self::not_exist());
        };
        if let Some(name) = &patch.name {
            object.name = name.clone();
        }
        if let Some(content) = &patch.content {
            object.content = content.clone();
        }
        if let Some(parent) = &patch.add_parent {
            object.parent = Some(parent.clone());
        } else if patch.remove_parent.is_some() {
            object.parent = None;
        }
        object.modified_at = stamp;
        inner.entry(id).ok_or(DriveError::InvalidResponse)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.delete += 1;
        inner.denied()?;
        if !inner.objects.contains_key(id) {
            return Err(Self::not_exist());
        }
        inner.remove_subtree(id);
        Ok(())
    }

    async fn copy(&self, id: &str, dest_parent_id: &str, new_name: &str) -> Result<RemoteEntry> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.copy += 1;
        inner.denied()?;
        if !inner.objects.contains_key(dest_parent_id) {
            return Err(Self::not_exist());
        }
        let new_id = inner
            .copy_subtree(id, dest_parent_id, new_name)
            .ok_or_else(Self::not_exist)?;
        inner.entry(&new_id).ok_or(DriveError::InvalidResponse)
    }

    async fn download(&self, id: &str) -> Result<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.download += 1;
        inner.denied()?;
        let object = inner.objects.get(id).ok_or_else(Self::not_exist)?;
        Ok(String::from_utf8_lossy(&object.content).into_owned())
    }
}
