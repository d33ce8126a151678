// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of the per-app locker.
//!
//! ```text
//! <locker>/<uuid>/<scope>/<owner>/page-<p>/{public,private,cache}
//! <locker>/<uuid>/<scope>/<owner>/logs/page-<p>-<recipe>.log
//! <locker>/<uuid>/shared
//! <locker>/<uuid>/global
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use lemc_adapters::Mount;
use lemc_core::{alnum_hyphen, JobRecipe, Scope, ScopeError, Step};

/// Owner directory used by every shared-scope run.
pub const SHARED_OWNER: &str = "shared-user";

/// Label value marking containers started by this engine.
pub const OWNED_BY: &str = "LEMC";

/// Root of the locker tree, plus the path the container runtime sees it
/// under when the daemon itself runs in a container.
#[derive(Debug, Clone)]
pub struct Locker {
    root: PathBuf,
    host_root: Option<PathBuf>,
}

impl Locker {
    pub fn new(root: impl Into<PathBuf>, host_root: Option<PathBuf>) -> Self {
        Self { root: root.into(), host_root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve every path one job touches.
    pub fn layout(&self, job: &JobRecipe) -> Result<JobLayout, ScopeError> {
        let scope = job.scope()?;
        let owner = match scope {
            Scope::Individual => format!("{}-{}", alnum_hyphen(&job.username), job.user_id),
            Scope::Shared => SHARED_OWNER.to_string(),
        };
        Ok(JobLayout {
            root: self.root.clone(),
            bind_root: self.host_root.clone().unwrap_or_else(|| self.root.clone()),
            uuid: job.uuid.clone(),
            page_id: job.page_id.clone(),
            scope,
            owner,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLayout {
    root: PathBuf,
    bind_root: PathBuf,
    uuid: String,
    page_id: String,
    scope: Scope,
    owner: String,
}

impl JobLayout {
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// `<alnum-hyphen(username)>-<user id>` or `shared-user`
    pub fn owner(&self) -> &str {
        &self.owner
    }

    fn owner_dir(&self, root: &Path) -> PathBuf {
        root.join(&self.uuid).join(self.scope.to_string()).join(&self.owner)
    }

    fn page_dir(&self, root: &Path) -> PathBuf {
        self.owner_dir(root).join(format!("page-{}", self.page_id))
    }

    pub fn public_dir(&self) -> PathBuf {
        self.page_dir(&self.root).join("public")
    }

    pub fn private_dir(&self) -> PathBuf {
        self.page_dir(&self.root).join("private")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.page_dir(&self.root).join("cache")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.owner_dir(&self.root).join("logs")
    }

    /// Step log for one recipe on this page.
    pub fn log_file(&self, recipe_name: &str) -> PathBuf {
        self.log_dir().join(format!(
            "{}-{}.log",
            alnum_hyphen(&format!("page-{}", self.page_id)),
            alnum_hyphen(recipe_name)
        ))
    }

    pub fn shared_dir(&self) -> PathBuf {
        self.root.join(&self.uuid).join("shared")
    }

    pub fn global_dir(&self) -> PathBuf {
        self.root.join(&self.uuid).join("global")
    }

    /// Create every directory a step may write to.
    pub fn ensure_dirs(&self) -> io::Result<()> {
        let mut dirs = vec![
            self.public_dir(),
            self.private_dir(),
            self.cache_dir(),
            self.log_dir(),
            self.global_dir(),
        ];
        if self.scope == Scope::Shared {
            dirs.push(self.shared_dir());
        }
        for dir in dirs {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Bind mounts, with sources expressed in the runtime's view of the locker.
    pub fn mounts(&self) -> Vec<Mount> {
        let bind = |p: PathBuf| p.to_string_lossy().into_owned();
        let page = self.page_dir(&self.bind_root);
        let app = self.bind_root.join(&self.uuid);
        let mut mounts = vec![
            Mount::new(bind(page.join("public")), "/lemc/public"),
            Mount::new(bind(page.join("private")), "/lemc/private"),
            Mount::new(bind(app.join("global")), "/lemc/global"),
        ];
        if self.scope == Scope::Shared {
            mounts.push(Mount::new(bind(app.join("shared")), "/lemc/shared"));
        }
        mounts
    }

    /// Labels identifying the container of one step of one job.
    pub fn labels(&self, job: &JobRecipe, step: &Step) -> BTreeMap<String, String> {
        [
            ("UUID", job.uuid.clone()),
            ("STEP_ID", step.step.to_string()),
            ("CONTRACT_ID", job.page_id.clone()),
            ("USER_ID", job.user_id.clone()),
            ("USERNAME", self.owner.clone()),
            ("RECIPE_NAME", job.recipe.name.clone()),
            ("OWNED_BY", OWNED_BY.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    pub fn container_name(&self, recipe_name: &str, step: &Step) -> String {
        format!(
            "uuid-{}-page-{}-recipe-{}-step-{}-scope-{}-username-{}",
            self.uuid,
            self.page_id,
            alnum_hyphen(recipe_name),
            step.step,
            self.scope,
            self.owner
        )
    }
}

#[cfg(test)]
#[path = "locker_tests.rs"]
mod tests;
