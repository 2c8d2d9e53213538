//! Artifacts statically inferred from blueprint actions.

/// A file a blueprint creates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileArtifact {
    pub path: String,
}

/// A file a blueprint modifies in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancedFileArtifact {
    pub path: String,
    pub modifier: Option<String>,
}

/// One package-install action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    pub packages: Vec<String>,
    pub is_dev: bool,
}

/// An environment variable a blueprint sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVarArtifact {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
}

/// Everything one blueprint produces, in action order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleArtifacts {
    pub creates: Vec<FileArtifact>,
    pub enhances: Vec<EnhancedFileArtifact>,
    pub installs: Vec<PackageArtifact>,
    pub env_vars: Vec<EnvVarArtifact>,
}

impl ModuleArtifacts {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty()
            && self.enhances.is_empty()
            && self.installs.is_empty()
            && self.env_vars.is_empty()
    }

    /// Records a created file once, keeping first-seen order.
    pub fn add_create(&mut self, path: String) {
        if !self.creates.iter().any(|f| f.path == path) {
            self.creates.push(FileArtifact { path });
        }
    }

    pub fn add_enhance(&mut self, path: String, modifier: Option<String>) {
        let artifact = EnhancedFileArtifact { path, modifier };
        if !self.enhances.contains(&artifact) {
            self.enhances.push(artifact);
        }
    }

    pub fn add_install(&mut self, packages: Vec<String>, is_dev: bool) {
        if !packages.is_empty() {
            self.installs.push(PackageArtifact { packages, is_dev });
        }
    }

    /// Records an env var; a repeated key keeps the first definition.
    pub fn add_env_var(&mut self, key: String, value: String, description: Option<String>) {
        if !self.env_vars.iter().any(|e| e.key == key) {
            self.env_vars.push(EnvVarArtifact { key, value, description });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup() {
        let mut artifacts = ModuleArtifacts::default();
        artifacts.add_create("src/db.ts".to_string());
        artifacts.add_create("src/db.ts".to_string());
        artifacts.add_env_var("DATABASE_URL".to_string(), "a".to_string(), None);
        artifacts.add_env_var("DATABASE_URL".to_string(), "b".to_string(), None);
        artifacts.add_install(Vec::new(), false);

        assert_eq!(artifacts.creates.len(), 1);
        assert_eq!(artifacts.env_vars[0].value, "a");
        assert!(artifacts.installs.is_empty());
    }
}
