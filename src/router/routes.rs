//! Route table: which pages exist, which are public, which need a session.
//!
//! DESIGN
//! ======
//! Routes nest. A resolved path yields the chain of matched records from the
//! root down to the leaf, and flags apply if ANY record in the chain sets
//! them, so marking the `/` layout `requires_auth` protects every child.
//! Records that only redirect are followed before guards see the match.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    pub label: String,
    /// Icon name understood by the UI layer.
    pub icon: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub public: bool,
    pub requires_auth: bool,
    /// Excluded from navigation menus.
    pub hidden: bool,
    pub sidebar: Option<SidebarEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRecord {
    pub name: Option<String>,
    /// Absolute for top-level records, relative to the parent for children.
    pub path: String,
    pub meta: RouteMeta,
    /// Name of the route this record redirects to.
    pub redirect: Option<String>,
    pub children: Vec<RouteRecord>,
}

impl RouteRecord {
    pub fn new(name: Option<&str>, path: &str) -> Self {
        Self {
            name: name.map(str::to_owned),
            path: path.to_owned(),
            meta: RouteMeta::default(),
            redirect: None,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn public(mut self) -> Self {
        self.meta.public = true;
        self
    }

    #[must_use]
    pub fn requires_auth(mut self) -> Self {
        self.meta.requires_auth = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.meta.hidden = true;
        self
    }

    #[must_use]
    pub fn sidebar(mut self, label: &str, icon: &str) -> Self {
        self.meta.sidebar = Some(SidebarEntry { label: label.to_owned(), icon: icon.to_owned() });
        self
    }

    #[must_use]
    pub fn redirect_to(mut self, name: &str) -> Self {
        self.redirect = Some(name.to_owned());
        self
    }

    #[must_use]
    pub fn children(mut self, children: Vec<RouteRecord>) -> Self {
        self.children = children;
        self
    }
}

/// Result of resolving a path against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub path: String,
    /// Leaf route name, if the leaf is named.
    pub name: Option<String>,
    /// Metadata of every matched record, root first.
    pub chain: Vec<RouteMeta>,
}

impl RouteMatch {
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.chain.iter().any(|m| m.public)
    }

    #[must_use]
    pub fn requires_auth(&self) -> bool {
        self.chain.iter().any(|m| m.requires_auth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarItem {
    pub label: String,
    pub icon: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteRecord>,
}

impl Default for RouteTable {
    /// Login and register are public; everything under `/` needs a session.
    fn default() -> Self {
        Self::new(vec![
            RouteRecord::new(Some("login"), "/login").public(),
            RouteRecord::new(Some("register"), "/register").public(),
            RouteRecord::new(None, "/").requires_auth().children(vec![
                RouteRecord::new(None, "").hidden().redirect_to("dashboard"),
                RouteRecord::new(Some("settings"), "settings").hidden(),
                RouteRecord::new(Some("dashboard"), "dashboard").sidebar("Dashboard", "LayoutDashboard"),
                RouteRecord::new(Some("stocks"), "stocks").sidebar("Stocks", "LineChart"),
            ]),
        ])
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteRecord>) -> Self {
        Self { routes }
    }

    /// Match `path`, following redirects. Unknown paths yield an empty chain.
    #[must_use]
    pub fn resolve(&self, path: &str) -> RouteMatch {
        let mut target = normalize(path);
        for _ in 0..MAX_REDIRECTS {
            let Some(records) = match_records(&self.routes, "", &target) else {
                break;
            };
            let Some(leaf) = records.last() else {
                break;
            };
            if let Some(next) = leaf.redirect.as_deref().and_then(|name| self.path_of(name)) {
                target = next;
                continue;
            }
            return RouteMatch {
                name: leaf.name.clone(),
                chain: records.iter().map(|r| r.meta.clone()).collect(),
                path: target,
            };
        }
        RouteMatch { path: target, name: None, chain: Vec::new() }
    }

    /// Absolute path of the route called `name`.
    #[must_use]
    pub fn path_of(&self, name: &str) -> Option<String> {
        find_path(&self.routes, "", name)
    }

    /// Visible, labelled children of the `/` layout, in declaration order.
    #[must_use]
    pub fn sidebar(&self) -> Vec<SidebarItem> {
        let Some(layout) = self.routes.iter().find(|r| r.path == "/") else {
            return Vec::new();
        };
        layout
            .children
            .iter()
            .filter(|r| !r.meta.hidden)
            .filter_map(|r| {
                let entry = r.meta.sidebar.as_ref()?;
                Some(SidebarItem {
                    label: entry.label.clone(),
                    icon: entry.icon.clone(),
                    path: with_leading_slash(&r.path),
                })
            })
            .collect()
    }
}

fn match_records<'a>(records: &'a [RouteRecord], parent: &str, target: &str) -> Option<Vec<&'a RouteRecord>> {
    for record in records {
        let full = join(parent, &record.path);
        if let Some(mut tail) = match_records(&record.children, &full, target) {
            tail.insert(0, record);
            return Some(tail);
        }
        if full == target {
            return Some(vec![record]);
        }
    }
    None
}

fn find_path(records: &[RouteRecord], parent: &str, name: &str) -> Option<String> {
    records.iter().find_map(|record| {
        let full = join(parent, &record.path);
        if record.name.as_deref() == Some(name) {
            return Some(full);
        }
        find_path(&record.children, &full, name)
    })
}

fn join(parent: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_owned()
    } else if path.is_empty() {
        parent.to_owned()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), path)
    };
    normalize(&joined)
}

fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default().trim();
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

fn with_leading_slash(path: &str) -> String {
    if path.starts_with('/') { path.to_owned() } else { format!("/{path}") }
}
