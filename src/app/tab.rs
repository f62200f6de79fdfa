use crate::config::AppConfig;
use crate::filter::{apply_filter, FilterState};
use crate::record::{ColumnLayout, Record, RecordStore};
use crate::session::TabDescriptor;
use crate::sort::SortSpec;
use crate::view::{Paginator, View};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

pub type TabId = u64;

/// One open file or merge group with its filter, sort and paging state
///
/// Every filter or sort change rebuilds the view from the full store and
/// rewinds paging to the first page.
#[derive(Debug)]
pub struct Tab {
    id: TabId,
    descriptor: TabDescriptor,
    store: Arc<RecordStore>,
    skipped: usize,
    filter: FilterState,
    sort: Option<SortSpec>,
    view: View,
    paginator: Paginator,
    layout: ColumnLayout,
}

impl Tab {
    pub fn new(
        id: TabId,
        descriptor: TabDescriptor,
        store: Arc<RecordStore>,
        skipped: usize,
        config: &AppConfig,
    ) -> Self {
        let layout = ColumnLayout::new(store.columns(), &config.visible_columns);
        let view = View::unfiltered(Arc::clone(&store));
        Self {
            id,
            descriptor,
            store,
            skipped,
            filter: FilterState::default(),
            sort: None,
            view,
            paginator: Paginator::new(config.page_size),
            layout,
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn descriptor(&self) -> &TabDescriptor {
        &self.descriptor
    }

    pub fn display_name(&self) -> String {
        self.descriptor.display_name()
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// Malformed lines dropped while loading
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn columns(&self) -> &[String] {
        self.store.columns()
    }

    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn set_search(&mut self, raw: &str) -> &View {
        self.filter.set_search(raw);
        self.refresh()
    }

    pub fn set_time_range(&mut self, lower: Option<&str>, upper: Option<&str>) -> &View {
        self.filter.set_time_range(lower, upper);
        self.refresh()
    }

    pub fn set_levels<I, S>(&mut self, levels: I) -> &View
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.filter.set_levels(levels);
        self.refresh()
    }

    /// Drop every filter; the current sort stays
    pub fn clear_filters(&mut self) -> &View {
        self.filter = FilterState::default();
        self.refresh()
    }

    /// Sort by `field`, toggling when it is already the sort field
    pub fn sort_by(&mut self, field: &str) -> &View {
        self.view = self.view.sort_by(field);
        self.sort = self.view.sort_spec().cloned();
        self.paginator.reset();
        &self.view
    }

    /// Next page of the current view; empty once everything is delivered
    pub fn next_page(&mut self) -> Vec<Arc<Record>> {
        self.paginator.next_page(&self.view)
    }

    /// `(field, text)` pairs of the record at `position` in the view
    pub fn record_details(&self, position: usize) -> Option<Vec<(String, String)>> {
        self.view
            .get(position)
            .map(|record| self.layout.record_details(record))
    }

    fn refresh(&mut self) -> &View {
        let view = apply_filter(&self.store, &self.filter);
        self.view = match &self.sort {
            Some(spec) => view.sorted(spec.clone()),
            None => view,
        };
        self.paginator.reset();
        &self.view
    }
}

/// Shared handle to a [`Tab`]; each tab has its own lock
#[derive(Debug, Clone)]
pub struct TabHandle {
    id: TabId,
    descriptor: Arc<TabDescriptor>,
    tab: Arc<Mutex<Tab>>,
}

impl TabHandle {
    pub(crate) fn new(tab: Tab) -> Self {
        Self {
            id: tab.id,
            descriptor: Arc::new(tab.descriptor.clone()),
            tab: Arc::new(Mutex::new(tab)),
        }
    }

    pub fn id(&self) -> TabId {
        self.id
    }

    pub fn descriptor(&self) -> &TabDescriptor {
        &self.descriptor
    }

    pub fn display_name(&self) -> String {
        self.descriptor.display_name()
    }

    /// Exclusive access for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, Tab> {
        self.tab.lock()
    }

    pub fn set_search(&self, raw: &str) -> usize {
        self.tab.lock().set_search(raw).len()
    }

    pub fn set_time_range(&self, lower: Option<&str>, upper: Option<&str>) -> usize {
        self.tab.lock().set_time_range(lower, upper).len()
    }

    pub fn set_levels<I, S>(&self, levels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tab.lock().set_levels(levels).len()
    }

    pub fn clear_filters(&self) -> usize {
        self.tab.lock().clear_filters().len()
    }

    pub fn sort_by(&self, field: &str) -> Option<SortSpec> {
        self.tab.lock().sort_by(field).sort_spec().cloned()
    }

    pub fn next_page(&self) -> Vec<Arc<Record>> {
        self.tab.lock().next_page()
    }
}
