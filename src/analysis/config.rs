//! Analysis configuration.
//!
//! Everything tunable about a run lives here: traversal bounds, the mapping
//! framework's call vocabulary, and the naming conventions the classifier
//! uses to recognise entry points, services and data access.

use smol_str::SmolStr;

use crate::hir::simple_name_of;

/// Default maximum hierarchy depth.
pub const DEFAULT_MAX_DEPTH: usize = 12;
/// Default cap on distinct callers expanded per method.
pub const DEFAULT_MAX_CALLERS: usize = 25;
/// Default cap on call sites kept per caller.
pub const DEFAULT_MAX_SITES_PER_CALLER: usize = 5;
/// Default cap on the total number of nodes in one tree.
pub const DEFAULT_MAX_NODES: usize = 5_000;

/// Bounds and conventions for one analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct AnalysisConfig {
    /// Maximum depth of caller expansion below the seed.
    pub max_depth: usize,
    /// Callers expanded per method, in discovery order.
    pub max_callers: usize,
    /// Call sites kept per caller, in discovery order.
    pub max_sites_per_caller: usize,
    /// Total node budget for one tree.
    pub max_nodes: usize,
    pub mapping: MappingVocabulary,
    pub conventions: NamingConventions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_callers: DEFAULT_MAX_CALLERS,
            max_sites_per_caller: DEFAULT_MAX_SITES_PER_CALLER,
            max_nodes: DEFAULT_MAX_NODES,
            mapping: MappingVocabulary::default(),
            conventions: NamingConventions::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_callers(mut self, max_callers: usize) -> Self {
        self.max_callers = max_callers;
        self
    }

    pub fn with_max_sites_per_caller(mut self, max_sites: usize) -> Self {
        self.max_sites_per_caller = max_sites;
        self
    }

    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_mapping(mut self, mapping: MappingVocabulary) -> Self {
        self.mapping = mapping;
        self
    }

    pub fn with_conventions(mut self, conventions: NamingConventions) -> Self {
        self.conventions = conventions;
        self
    }
}

// ============================================================================
// MAPPING VOCABULARY
// ============================================================================

/// The fixed call-pattern vocabulary of the mapping framework.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct MappingVocabulary {
    /// Transform entrypoints.
    pub methods: Vec<SmolStr>,
    /// Entrypoints whose source argument is a collection or array.
    pub collection_methods: Vec<SmolStr>,
    /// Type-name patterns of the facade the entrypoints live on.
    pub facade_patterns: Vec<SmolStr>,
    /// Type-name patterns of the factory that hands out facades.
    pub factory_patterns: Vec<SmolStr>,
    /// Factory method returning a facade.
    pub facade_accessor: SmolStr,
}

impl Default for MappingVocabulary {
    fn default() -> Self {
        Self {
            methods: names(&["map", "mapAsList", "mapAsSet", "mapAsArray"]),
            collection_methods: names(&["mapAsList", "mapAsSet", "mapAsArray"]),
            facade_patterns: names(&["MapperFacade", "BoundMapperFacade", "ConfigurableMapper"]),
            factory_patterns: names(&["MapperFactory"]),
            facade_accessor: SmolStr::new_static("getMapperFacade"),
        }
    }
}

impl MappingVocabulary {
    pub fn is_transform_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m == name)
    }

    pub fn is_collection_method(&self, name: &str) -> bool {
        self.collection_methods.iter().any(|m| m == name)
    }

    pub fn is_facade_type(&self, type_name: &str) -> bool {
        self.facade_patterns
            .iter()
            .any(|p| matches_type_pattern(type_name, p))
    }

    pub fn is_factory_type(&self, type_name: &str) -> bool {
        self.factory_patterns
            .iter()
            .any(|p| matches_type_pattern(type_name, p))
    }
}

/// A qualified pattern (`ma.glasnost.orika.MapperFacade`) must match the
/// whole name; a simple pattern matches any type whose simple name ends
/// with it (`OrderMapperFacade` matches `MapperFacade`).
pub fn matches_type_pattern(type_name: &str, pattern: &str) -> bool {
    let type_name = type_name.trim();
    if pattern.contains('.') {
        type_name == pattern
    } else {
        simple_name_of(type_name).ends_with(pattern)
    }
}

// ============================================================================
// NAMING CONVENTIONS
// ============================================================================

/// Conventions the node classifier matches against.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "interchange", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "interchange", serde(default))]
pub struct NamingConventions {
    pub entry_point_owner_suffixes: Vec<SmolStr>,
    pub entry_point_owner_annotations: Vec<SmolStr>,
    pub entry_point_method_annotations: Vec<SmolStr>,
    /// Method names that are application entry points on any owner.
    pub entry_point_method_names: Vec<SmolStr>,
    pub data_access_owner_suffixes: Vec<SmolStr>,
    pub data_access_owner_annotations: Vec<SmolStr>,
    pub service_owner_suffixes: Vec<SmolStr>,
    pub service_owner_annotations: Vec<SmolStr>,
}

impl Default for NamingConventions {
    fn default() -> Self {
        Self {
            entry_point_owner_suffixes: names(&["Controller", "Resource", "Endpoint"]),
            entry_point_owner_annotations: names(&["RestController", "Controller", "Path"]),
            entry_point_method_annotations: names(&[
                "RequestMapping",
                "GetMapping",
                "PostMapping",
                "PutMapping",
                "DeleteMapping",
                "PatchMapping",
                "GET",
                "POST",
                "PUT",
                "DELETE",
                "PATCH",
                "KafkaListener",
                "RabbitListener",
                "JmsListener",
                "Scheduled",
                "EventListener",
            ]),
            entry_point_method_names: names(&["main"]),
            data_access_owner_suffixes: names(&[
                "Repository",
                "RepositoryImpl",
                "Dao",
                "DaoImpl",
                "DAO",
            ]),
            data_access_owner_annotations: names(&["Repository"]),
            service_owner_suffixes: names(&["Service", "ServiceImpl"]),
            service_owner_annotations: names(&["Service"]),
        }
    }
}

fn names(items: &[&'static str]) -> Vec<SmolStr> {
    items.iter().map(|s| SmolStr::new_static(s)).collect()
}
