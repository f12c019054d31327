//! Traversal classifier for stateful code in bean classes
//!
//! Walks one parsed compilation unit and classifies every field-mutation
//! site against the exemption rules. Context is carried in boolean flags
//! with explicit save/restore pairs around each nested scope entry, so
//! re-entrant traversal (anonymous class bodies, methods within methods)
//! composes without an explicit stack.
//!
//! All state is per-compilation-unit: a fresh detector is created for each
//! file, and per-class collections are reset whenever a class declaration
//! is entered.

use std::collections::{BTreeMap, HashMap};

use tree_sitter::Node;

use crate::analyzer::exemptions;
use crate::analyzer::java;
use crate::domain::{IssueKind, IssueLevel, StatefulIssue};

/// One declared instance field of the class currently being traversed.
#[derive(Debug)]
struct FieldRecord {
    /// Raw textual type descriptor as written in source
    declared_type: String,
    is_final: bool,
    is_static_final: bool,
    is_injected: bool,
}

impl FieldRecord {
    /// Final, static-final, and injected fields never produce issues.
    fn is_exempt(&self) -> bool {
        self.is_final || self.is_static_final || self.is_injected
    }
}

/// Per-class verdict, computed once when the class declaration is entered.
#[derive(Debug, Clone, Copy, Default)]
struct ClassVerdict {
    is_eligible_component: bool,
    is_configuration_binding: bool,
    is_exempt_scope: bool,
}

/// Transient method/block context. A mutation is exempt when any relevant
/// flag is set at the moment it is visited.
#[derive(Debug, Default)]
struct TraversalState {
    method_name: String,
    in_constructor: bool,
    in_initializer: bool,
    in_static_initializer: bool,
}

/// Detector that finds stateful code patterns in Spring and EJB beans.
pub struct StatefulCodeDetector<'a> {
    src: &'a [u8],
    additional_scopes: &'a [String],
    verdict: ClassVerdict,
    fields: HashMap<String, FieldRecord>,
    issues: BTreeMap<String, Vec<StatefulIssue>>,
    state: TraversalState,
}

impl<'a> StatefulCodeDetector<'a> {
    /// Create a detector for one compilation unit's source text.
    pub fn new(source: &'a str, additional_scopes: &'a [String]) -> Self {
        Self {
            src: source.as_bytes(),
            additional_scopes,
            verdict: ClassVerdict::default(),
            fields: HashMap::new(),
            issues: BTreeMap::new(),
            state: TraversalState::default(),
        }
    }

    /// Traverse the whole compilation unit.
    pub fn visit_unit(&mut self, root: Node<'_>) {
        self.visit_children(root);
    }

    /// Whether any issue was recorded.
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Flush accumulated issues, grouped by field name in sorted order.
    pub fn into_issues(self) -> Vec<StatefulIssue> {
        self.issues.into_values().flatten().collect()
    }

    fn visit(&mut self, node: Node<'_>) {
        match node.kind() {
            "class_declaration" => self.enter_class(node),
            "method_declaration" => self.enter_method(node, false),
            "constructor_declaration" => self.enter_method(node, true),
            "static_initializer" => self.enter_static_initializer(node),
            "assignment_expression" => {
                self.on_assignment(node);
                self.visit_children(node);
            }
            "update_expression" => {
                self.on_update(node);
                self.visit_children(node);
            }
            "method_invocation" => {
                self.on_invocation(node);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: Node<'_>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child);
        }
    }

    /// Class entry: replace the verdict and reset all per-class collections.
    /// The verdict is restored on exit so nested class declarations do not
    /// leak their classification into the enclosing class's remainder.
    ///
    /// Field records come from the class body's direct members only.
    /// Anonymous class bodies encountered deeper in the traversal declare
    /// per-instance fields that are not singleton state, so those are never
    /// tracked.
    fn enter_class(&mut self, node: Node<'_>) {
        let annotations = java::annotations(node, self.src);
        let saved_verdict = self.verdict;

        self.verdict = ClassVerdict {
            is_eligible_component: exemptions::is_eligible_component(&annotations),
            is_configuration_binding: exemptions::is_configuration_binding_class(&annotations),
            is_exempt_scope: exemptions::is_exempt_scope(&annotations, self.additional_scopes),
        };
        self.fields.clear();
        self.issues.clear();

        if self.verdict.is_eligible_component {
            if let Some(body) = node.child_by_field_name("body") {
                let mut cursor = body.walk();
                for member in body.children(&mut cursor) {
                    if member.kind() == "field_declaration" {
                        self.record_field(member);
                    }
                }
            }
        }

        self.visit_children(node);

        self.verdict = saved_verdict;
    }

    fn record_field(&mut self, node: Node<'_>) {
        let declared_type = node
            .child_by_field_name("type")
            .map(|ty| java::node_text(ty, self.src).to_string())
            .unwrap_or_default();
        let is_final = java::has_modifier(node, "final");
        let is_static = java::has_modifier(node, "static");
        let is_injected = exemptions::is_injected(&java::annotations(node, self.src));

        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            if let Some(name) = declarator.child_by_field_name("name") {
                self.fields.insert(
                    java::node_text(name, self.src).to_string(),
                    FieldRecord {
                        declared_type: declared_type.clone(),
                        is_final,
                        is_static_final: is_final && is_static,
                        is_injected,
                    },
                );
            }
        }
    }

    /// Method entry. An initializer method (`@PostConstruct` or
    /// `afterPropertiesSet`) sets the initializer flag, but only when we are
    /// not already inside an initializer context: anonymous class bodies
    /// declared inside an initializer are traversed as nested method
    /// declarations and must inherit the exemption (and the outer method
    /// name) instead of being reclassified by their own name.
    fn enter_method(&mut self, node: Node<'_>, is_constructor: bool) {
        if !self.verdict.is_eligible_component {
            self.visit_children(node);
            return;
        }

        let saved_method_name = std::mem::take(&mut self.state.method_name);
        let saved_in_constructor = self.state.in_constructor;

        let name = node
            .child_by_field_name("name")
            .map(|n| java::node_text(n, self.src))
            .unwrap_or("");
        if self.state.in_initializer {
            self.state.method_name = saved_method_name.clone();
        } else {
            self.state.method_name = name.to_string();
        }
        self.state.in_constructor = is_constructor;

        // Only the method that set the flag restores it.
        let sets_initializer = !self.state.in_initializer
            && exemptions::is_initializer_method(&java::annotations(node, self.src), name);
        if sets_initializer {
            self.state.in_initializer = true;
        }

        self.visit_children(node);

        if sets_initializer {
            self.state.in_initializer = false;
        }
        self.state.in_constructor = saved_in_constructor;
        self.state.method_name = saved_method_name;
    }

    fn enter_static_initializer(&mut self, node: Node<'_>) {
        let saved = self.state.in_static_initializer;
        self.state.in_static_initializer = true;

        self.visit_children(node);

        self.state.in_static_initializer = saved;
    }

    fn on_assignment(&mut self, node: Node<'_>) {
        if !self.verdict.is_eligible_component {
            return;
        }
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        let Some(field_name) = self.target_field_name(left) else {
            return;
        };

        let operator = node
            .child_by_field_name("operator")
            .map(|op| java::node_text(op, self.src))
            .unwrap_or("=");
        let kind = if operator == "=" {
            IssueKind::FieldAssignment
        } else {
            IssueKind::CompoundAssignment
        };

        self.record_mutation(&field_name, kind, None);
    }

    fn on_update(&mut self, node: Node<'_>) {
        if !self.verdict.is_eligible_component {
            return;
        }

        let mut cursor = node.walk();
        let mut operand = None;
        let mut kind = None;
        for child in node.children(&mut cursor) {
            match child.kind() {
                "++" => kind = Some(IssueKind::Increment),
                "--" => kind = Some(IssueKind::Decrement),
                _ => operand = Some(child),
            }
        }

        let (Some(kind), Some(operand)) = (kind, operand) else {
            return;
        };
        if let Some(field_name) = self.target_field_name(operand) {
            self.record_mutation(&field_name, kind, None);
        }
    }

    fn on_invocation(&mut self, node: Node<'_>) {
        if !self.verdict.is_eligible_component {
            return;
        }
        let Some(object) = node.child_by_field_name("object") else {
            return;
        };
        let Some(name) = node.child_by_field_name("name") else {
            return;
        };

        let method_name = java::node_text(name, self.src);
        if !exemptions::is_collection_mutator(method_name) {
            return;
        }
        if let Some(field_name) = self.target_field_name(object) {
            self.record_mutation(
                &field_name,
                IssueKind::CollectionModification,
                Some(method_name),
            );
        }
    }

    /// Resolve a mutation target to a field name: a bare identifier, or a
    /// qualified `this.field` access. Anything else is not a field target.
    fn target_field_name(&self, expr: Node<'_>) -> Option<String> {
        match expr.kind() {
            "identifier" => Some(java::node_text(expr, self.src).to_string()),
            "field_access" => {
                let object = expr.child_by_field_name("object")?;
                if object.kind() != "this" {
                    return None;
                }
                expr.child_by_field_name("field")
                    .map(|field| java::node_text(field, self.src).to_string())
            }
            _ => None,
        }
    }

    /// Classify one mutation site. Ordering follows the rule book: tracked
    /// field, field-level exemption, context exemption, configuration
    /// binding (plain assignment only), thread-safe collection (collection
    /// modification only), then record.
    fn record_mutation(&mut self, field_name: &str, kind: IssueKind, mutator: Option<&str>) {
        let Some(record) = self.fields.get(field_name) else {
            return;
        };
        if record.is_exempt() {
            return;
        }
        if self.state.in_constructor
            || self.state.in_initializer
            || self.state.in_static_initializer
            || self.verdict.is_exempt_scope
        {
            return;
        }
        if kind == IssueKind::FieldAssignment && self.verdict.is_configuration_binding {
            return;
        }
        if kind == IssueKind::CollectionModification
            && exemptions::is_thread_safe_collection(&record.declared_type)
        {
            return;
        }

        let mut issue = StatefulIssue::new(
            field_name,
            kind,
            self.state.method_name.clone(),
            IssueLevel::Error,
        );
        if let Some(mutator) = mutator {
            issue = issue.with_mutator(mutator);
        }
        self.issues
            .entry(field_name.to_string())
            .or_default()
            .push(issue);
    }
}
