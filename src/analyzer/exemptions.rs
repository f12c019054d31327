//! Exemption rules for stateful-code detection
//!
//! Stateless predicates over a declaration's annotations and modifiers.
//! Marker names are matched by simple name; scope arguments are matched as
//! raw substrings of the annotation-argument text. That matching is loose on
//! purpose: it mirrors how the scope value appears in source (quoted string
//! or `SCOPE_REQUEST` constant) rather than resolving the argument, and an
//! unrelated token containing one of the markers will also match.

use crate::analyzer::java::AnnotationInfo;

/// Class-level markers that make a class a framework-managed bean,
/// including the EJB stateless-session family.
pub const BEAN_MARKERS: [&str; 9] = [
    "Component",
    "Service",
    "Repository",
    "Controller",
    "RestController",
    "Configuration",
    "Bean",
    "Stateless",
    "Singleton",
];

/// The Spring component family eligible for the scope workaround.
/// Stateless-session beans are deliberately excluded.
pub const REMEDIABLE_MARKERS: [&str; 5] = [
    "Component",
    "Service",
    "Repository",
    "Controller",
    "RestController",
];

/// Field markers indicating the framework populates the field once.
pub const INJECTION_MARKERS: [&str; 8] = [
    "Autowired",
    "Inject",
    "Resource",
    "Value",
    "Qualifier",
    "EJB",
    "PersistenceContext",
    "PersistenceUnit",
];

/// Concurrency-safe container types from `java.util.concurrent`, matched as
/// substrings of the field's raw declared type.
pub const THREAD_SAFE_COLLECTIONS: [&str; 17] = [
    "ConcurrentHashMap",
    "ConcurrentLinkedQueue",
    "ConcurrentLinkedDeque",
    "ConcurrentSkipListMap",
    "ConcurrentSkipListSet",
    "ConcurrentMap",
    "ConcurrentNavigableMap",
    "CopyOnWriteArrayList",
    "CopyOnWriteArraySet",
    "LinkedBlockingQueue",
    "LinkedBlockingDeque",
    "ArrayBlockingQueue",
    "PriorityBlockingQueue",
    "SynchronousQueue",
    "DelayQueue",
    "LinkedTransferQueue",
    "TransferQueue",
];

/// Call names treated as collection mutations. Any other method name is
/// never classified as a mutation, whatever the receiver's type.
pub const COLLECTION_MUTATORS: [&str; 8] = [
    "add", "remove", "addAll", "removeAll", "clear", "put", "putAll", "removeIf",
];

const CONFIGURATION_BINDING_MARKER: &str = "ConfigurationProperties";
const REQUEST_SCOPE_MARKER: &str = "RequestScope";
const SCOPE_MARKER: &str = "Scope";
const INITIALIZER_MARKER: &str = "PostConstruct";
const INITIALIZER_METHOD_NAME: &str = "afterPropertiesSet";

/// Whether the class is a framework-managed bean subject to detection.
pub fn is_eligible_component(annotations: &[AnnotationInfo]) -> bool {
    annotations
        .iter()
        .any(|ann| BEAN_MARKERS.contains(&ann.name.as_str()))
}

/// Whether the class binds external configuration via setter-style
/// assignment. Such classes are exempt from field-assignment issues only.
pub fn is_configuration_binding_class(annotations: &[AnnotationInfo]) -> bool {
    annotations
        .iter()
        .any(|ann| ann.name == CONFIGURATION_BINDING_MARKER)
}

/// Whether the class declares a non-singleton scope under which instance
/// mutation is permitted: `@RequestScope`, or a `@Scope` whose argument text
/// contains `"prototype"`, `"request"`, the `SCOPE_REQUEST` constant, or any
/// caller-supplied additional scope name in quotes.
pub fn is_exempt_scope(annotations: &[AnnotationInfo], additional_scopes: &[String]) -> bool {
    if annotations.iter().any(|ann| ann.name == REQUEST_SCOPE_MARKER) {
        return true;
    }

    annotations.iter().any(|ann| {
        if ann.name != SCOPE_MARKER {
            return false;
        }
        let Some(args) = &ann.arguments else {
            return false;
        };

        if args.contains("\"prototype\"") || args.contains("\"request\"") || args.contains("SCOPE_REQUEST") {
            return true;
        }

        additional_scopes
            .iter()
            .any(|scope| args.contains(&format!("\"{scope}\"")))
    })
}

/// Whether a field carries an injection marker.
pub fn is_injected(annotations: &[AnnotationInfo]) -> bool {
    annotations
        .iter()
        .any(|ann| INJECTION_MARKERS.contains(&ann.name.as_str()))
}

/// Whether a method is a one-time initializer: `@PostConstruct` or the
/// `afterPropertiesSet` lifecycle callback.
pub fn is_initializer_method(annotations: &[AnnotationInfo], method_name: &str) -> bool {
    method_name == INITIALIZER_METHOD_NAME
        || annotations.iter().any(|ann| ann.name == INITIALIZER_MARKER)
}

/// Whether a field's raw declared type names a concurrency-safe container.
pub fn is_thread_safe_collection(declared_type: &str) -> bool {
    THREAD_SAFE_COLLECTIONS
        .iter()
        .any(|name| declared_type.contains(name))
}

/// Whether a call name is in the fixed collection-mutator set.
pub fn is_collection_mutator(method_name: &str) -> bool {
    COLLECTION_MUTATORS.contains(&method_name)
}
