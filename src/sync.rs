//! URL ⇄ storage ⇄ memory state synchronization.
//!
//! A [`SyncedField`] owns one named piece of screen state. Its current value
//! always comes from the URL query parameter of the same name (falling back to
//! the default). Writing goes out to both the persistent store and the URL.
//! The stored copy is only read back on request, either to rebuild a shareable
//! query ([`SyncedField::to_query_fragment`]) or while reconciling a screen on
//! mount ([`reconcile`]), which puts it back into a URL that carries none of
//! the screen's keys.
//!
//! Fields share the store and the URL but each touches only its own key.

use crate::kv::{self, KvStore};
use crate::location::Location;
use crate::query::{self, QueryParams};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Collaborators shared by every field on a screen.
#[derive(Clone)]
pub struct SyncContext {
    pub store: Arc<dyn KvStore>,
    pub location: Arc<dyn Location>,
}

impl SyncContext {
    pub fn new(store: Arc<dyn KvStore>, location: Arc<dyn Location>) -> Self {
        Self { store, location }
    }
}

/// Handle returned by [`SyncedField::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Transform<T> = Box<dyn Fn(T) -> T>;
type Listener<T> = Rc<dyn Fn(&T)>;

pub struct SyncedField<T> {
    key: &'static str,
    default: T,
    transform: Option<Transform<T>>,
    ctx: SyncContext,
    listeners: RefCell<Vec<(Subscription, Listener<T>)>>,
    next_id: Cell<u64>,
}

impl<T> SyncedField<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    pub fn new(ctx: SyncContext, key: &'static str, default: T) -> Self {
        Self {
            key,
            default,
            transform: None,
            ctx,
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Normalize every value read from the URL or storage (clamping, etc).
    pub fn with_transform(mut self, f: impl Fn(T) -> T + 'static) -> Self {
        self.transform = Some(Box::new(f));
        self
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    fn normalize(&self, value: T) -> T {
        match &self.transform {
            Some(f) => f(value),
            None => value,
        }
    }

    fn value_from(&self, params: &QueryParams) -> T {
        params
            .get(self.key)
            .and_then(query::decode_value::<T>)
            .map(|v| self.normalize(v))
            .unwrap_or_else(|| self.default.clone())
    }

    /// Current value: the URL parameter if present, else the default.
    pub fn read(&self) -> T {
        self.value_from(&query::parse(&self.ctx.location.search()))
    }

    /// Persist `value` to the store, then mirror it into the URL, then notify.
    pub fn write(&self, value: T) {
        let value = self.normalize(value);
        kv::save_json(self.ctx.store.as_ref(), self.key, &value);
        let encoded = self.mirror_to_url(&value);
        log::debug!("[sync] {} <- {}", self.key, encoded.as_deref().unwrap_or("<removed>"));

        self.notify(&value);
    }

    /// Replace this field's URL parameter with `value`. Returns the encoding.
    fn mirror_to_url(&self, value: &T) -> Option<String> {
        let encoded = serde_json::to_value(value)
            .ok()
            .and_then(|v| query::encode_value(&v));
        let search = self.ctx.location.search();
        let next = query::replace_query_param(&search, self.key, encoded.as_deref());
        self.ctx.location.replace_search(&next);
        encoded
    }

    /// Put the stored value (or default) back into the URL. Storage and
    /// subscribers are left alone.
    pub fn restore_url(&self) {
        self.mirror_to_url(&self.persisted());
    }

    /// Re-derive this field from another query string and write it.
    pub fn adopt_from_query(&self, external: &str) {
        let value = self.value_from(&query::parse(external));
        self.write(value);
    }

    /// The stored value (or default), decoded without touching anything.
    pub fn persisted(&self) -> T {
        kv::load_json::<T>(self.ctx.store.as_ref(), self.key)
            .map(|v| self.normalize(v))
            .unwrap_or_else(|| self.default.clone())
    }

    /// `key=value` built from the stored value, for rebuilding a screen URL.
    pub fn to_query_fragment(&self) -> String {
        let mut obj = Map::new();
        let value = serde_json::to_value(self.persisted()).unwrap_or(Value::Null);
        obj.insert(self.key.to_string(), value);
        query::obj_to_query_string(&obj)
    }

    /// Forget the stored value and drop the URL parameter.
    pub fn reset(&self) {
        self.ctx.store.remove(self.key);
        let next = query::replace_query_param(&self.ctx.location.search(), self.key, None);
        self.ctx.location.replace_search(&next);
        self.notify(&self.default.clone());
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: Subscription) {
        self.listeners.borrow_mut().retain(|(sid, _)| *sid != id);
    }

    /// Listeners may (un)subscribe while being called; changes apply to the next write.
    fn notify(&self, value: &T) {
        let listeners: Vec<Listener<T>> = self.listeners.borrow().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(value);
        }
    }
}

/// Object-safe view of a field, used by screen-wide aggregation.
pub trait QuerySynced {
    fn storage_key(&self) -> &'static str;
    fn adopt_from_query(&self, external: &str);
    fn to_query_fragment(&self) -> String;
    fn restore_url(&self);
}

impl<T> QuerySynced for SyncedField<T>
where
    T: Clone + Serialize + DeserializeOwned,
{
    fn storage_key(&self) -> &'static str {
        self.key
    }

    fn adopt_from_query(&self, external: &str) {
        SyncedField::adopt_from_query(self, external)
    }

    fn to_query_fragment(&self) -> String {
        SyncedField::to_query_fragment(self)
    }

    fn restore_url(&self) {
        SyncedField::restore_url(self)
    }
}

/// Query built from the stored state of every field.
pub fn screen_url_query(fields: &[&dyn QuerySynced]) -> String {
    let fragments: Vec<String> = fields.iter().map(|f| f.to_query_fragment()).collect();
    query::join_query_strings(fragments.iter().map(|f| Some(f.as_str())))
}

/// Overwrite stored state of every field from `external`.
pub fn set_screen_storage_from_query(fields: &[&dyn QuerySynced], external: &str) {
    for field in fields {
        field.adopt_from_query(external);
    }
}

/// Outcome of reconciling the URL with stored state on screen mount.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reconcile {
    /// Render as-is.
    RenderDirect,
    /// The URL had none of the screen's keys; stored state was written into it.
    RestoredFromStorage,
    /// Storage was overwritten from the URL; render again.
    AdoptedFromUrl,
}

/// Decide whether the URL or storage wins when a screen mounts.
///
/// - no query for these fields in the URL: copy stored state into the URL
/// - query matches the stored state (as key/value pairs): render directly
/// - query differs and `auto_sync` is on: overwrite storage from the URL
/// - query differs and `auto_sync` is off: the URL stays authoritative, storage untouched
pub fn reconcile(fields: &[&dyn QuerySynced], url_query: &str, auto_sync: bool) -> Reconcile {
    let mut url_params = QueryParams::new();
    let parsed = query::parse(url_query);
    for field in fields {
        if let Some(v) = parsed.get(field.storage_key()) {
            url_params.set(field.storage_key(), v);
        }
    }
    if url_params.is_empty() {
        for field in fields {
            field.restore_url();
        }
        return Reconcile::RestoredFromStorage;
    }

    let stored = query::parse(&screen_url_query(fields));
    if url_params.same_pairs(&stored) {
        return Reconcile::RenderDirect;
    }

    if auto_sync {
        log::debug!("[sync] url query differs from storage, adopting url");
        set_screen_storage_from_query(fields, url_query);
        Reconcile::AdoptedFromUrl
    } else {
        Reconcile::RenderDirect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use crate::location::MemoryLocation;
    use std::rc::Rc;

    fn ctx() -> (SyncContext, Arc<MemoryStore>, Arc<MemoryLocation>) {
        let store = Arc::new(MemoryStore::new());
        let location = Arc::new(MemoryLocation::new("/staking"));
        (SyncContext::new(store.clone(), location.clone()), store, location)
    }

    #[test]
    fn fresh_field_reads_default() {
        let (ctx, _, _) = ctx();
        let field = SyncedField::new(ctx, "searchText", String::new());
        assert_eq!(field.read(), "");
        assert_eq!(field.to_query_fragment(), "searchText=");
    }

    #[test]
    fn write_twice_is_idempotent() {
        let (ctx, store, location) = ctx();
        let field = SyncedField::new(ctx, "userAda", 10_000u64);
        field.write(500);
        field.write(500);
        assert_eq!(field.read(), 500);
        assert_eq!(store.get("userAda").as_deref(), Some("500"));
        assert_eq!(location.search(), "userAda=500");
    }

    #[test]
    fn write_leaves_other_params_alone() {
        let (ctx, _, location) = ctx();
        location.replace_search("tab=2&userAda=1");
        let field = SyncedField::new(ctx, "userAda", 0u64);
        field.write(7);
        assert_eq!(location.search(), "tab=2&userAda=7");
    }

    #[test]
    fn read_ignores_storage() {
        let (ctx, store, _) = ctx();
        store.set("showFilters", "true");
        let field = SyncedField::new(ctx, "showFilters", false);
        assert!(!field.read());
        assert!(field.persisted());
    }

    #[test]
    fn transform_applies_on_read_and_write() {
        let (ctx, store, location) = ctx();
        location.replace_search("userAda=900");
        let field = SyncedField::new(ctx, "userAda", 0u64).with_transform(|v| v.min(100));
        assert_eq!(field.read(), 100);
        field.write(5_000);
        assert_eq!(store.get("userAda").as_deref(), Some("100"));
    }

    #[test]
    fn adopt_missing_key_writes_default() {
        let (ctx, store, _) = ctx();
        let field = SyncedField::new(ctx, "sortBy", "revenue".to_string());
        field.write("age".into());
        field.adopt_from_query("other=1");
        assert_eq!(field.read(), "revenue");
        assert_eq!(store.get("sortBy").as_deref(), Some("\"revenue\""));
    }

    #[test]
    fn reset_clears_store_and_url() {
        let (ctx, store, location) = ctx();
        let field = SyncedField::new(ctx, "showFilters", false);
        field.write(true);
        field.reset();
        assert_eq!(store.get("showFilters"), None);
        assert_eq!(location.search(), "");
        assert!(!field.read());
    }

    #[test]
    fn subscribers_see_writes_until_unsubscribed() {
        let (ctx, _, _) = ctx();
        let field = SyncedField::new(ctx, "userAda", 0u64);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let id = field.subscribe(move |v| sink.borrow_mut().push(*v));
        field.write(1);
        field.write(2);
        field.unsubscribe(id);
        field.write(3);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let (ctx, _, _) = ctx();
        let field = Rc::new(SyncedField::new(ctx, "userAda", 0u64));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let slot = Rc::new(Cell::new(None));

        let (weak, sink, own) = (Rc::downgrade(&field), seen.clone(), slot.clone());
        let id = field.subscribe(move |v| {
            sink.borrow_mut().push(*v);
            if let (Some(f), Some(id)) = (weak.upgrade(), own.get()) {
                f.unsubscribe(id);
                f.subscribe(|_| {});
            }
        });
        slot.set(Some(id));

        field.write(1);
        field.write(2);
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(field.listeners.borrow().len(), 1);
    }

    #[test]
    fn empty_url_gets_stored_state() {
        let (ctx, store, location) = ctx();
        store.set("a", "7");
        location.replace_search("tab=2");
        let a = SyncedField::new(ctx.clone(), "a", 0u64);
        let b = SyncedField::new(ctx, "b", false);
        let fields: [&dyn QuerySynced; 2] = [&a, &b];

        assert_eq!(reconcile(&fields, &location.search(), true), Reconcile::RestoredFromStorage);
        assert_eq!(a.read(), 7);
        assert!(!b.read());
        assert_eq!(location.search(), "tab=2&a=7&b=false");
        assert_eq!(store.get("b"), None);
    }

    #[test]
    fn reconcile_policy() {
        let (ctx, _, _) = ctx();
        let a = SyncedField::new(ctx.clone(), "a", 0u64);
        let b = SyncedField::new(ctx, "b", false);
        let fields: [&dyn QuerySynced; 2] = [&a, &b];

        assert_eq!(reconcile(&fields, "", true), Reconcile::RestoredFromStorage);
        assert_eq!(reconcile(&fields, "tab=2", true), Reconcile::RestoredFromStorage);
        assert_eq!(a.persisted(), 0);

        assert_eq!(reconcile(&fields, "b=true&a=4", false), Reconcile::RenderDirect);
        assert_eq!(a.persisted(), 0);

        assert_eq!(reconcile(&fields, "b=true&a=4", true), Reconcile::AdoptedFromUrl);
        assert_eq!(a.persisted(), 4);
        assert!(b.persisted());

        // same pairs in a different order: no second adoption
        assert_eq!(reconcile(&fields, "a=4&b=true", true), Reconcile::RenderDirect);
        assert_eq!(reconcile(&fields, "tab=9&a=4&b=true", true), Reconcile::RenderDirect);
    }
}
