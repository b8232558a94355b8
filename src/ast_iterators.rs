use clang::*;

pub struct EntitySemanticParents<'a> {
    next: Option<Entity<'a>>,
}

impl<'a> Iterator for EntitySemanticParents<'a> {
    type Item = Entity<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let parent = self.next.and_then(|e| e.get_semantic_parent());
        let current = std::mem::replace(&mut self.next, parent);
        if self.next.is_some() {
            current
        } else {
            None
        }
    }
}

pub trait IterableEntity<'a> {
    /// The entity itself followed by its semantic ancestors, excluding the translation unit.
    fn semantic_parents(&self) -> EntitySemanticParents<'a>;

    /// Names of the enclosing namespaces and classes, outermost first.
    fn enclosing_scopes(&self) -> Vec<String>;
}

impl<'a> IterableEntity<'a> for Entity<'a> {
    fn semantic_parents(&self) -> EntitySemanticParents<'a> {
        EntitySemanticParents { next: Some(*self) }
    }

    fn enclosing_scopes(&self) -> Vec<String> {
        let mut scopes: Vec<_> = self
            .semantic_parents()
            .skip(1)
            .filter(|e| {
                matches!(
                    e.get_kind(),
                    EntityKind::Namespace
                        | EntityKind::ClassDecl
                        | EntityKind::StructDecl
                        | EntityKind::UnionDecl
                )
            })
            .map(|e| e.get_name().unwrap_or_default())
            .collect();
        scopes.reverse();
        scopes
    }
}

fn is_function_like(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::FunctionDecl
            | EntityKind::Method
            | EntityKind::Constructor
            | EntityKind::Destructor
    )
}

fn is_scope(entity: &Entity) -> bool {
    match entity.get_kind() {
        EntityKind::Namespace | EntityKind::ClassDecl | EntityKind::StructDecl => {
            entity.get_name().is_some()
        }
        // `extern "C"` blocks show up as unexposed declarations on older libclang.
        EntityKind::LinkageSpec | EntityKind::UnexposedDecl => true,
        _ => false,
    }
}

/// Function-like declarations of the main file in source order, descending into namespaces,
/// classes and linkage specifications.
pub fn function_declarations<'a>(root: &Entity<'a>) -> Vec<Entity<'a>> {
    let mut found = Vec::new();
    collect_function_declarations(root, &mut found);
    found
}

fn collect_function_declarations<'a>(parent: &Entity<'a>, found: &mut Vec<Entity<'a>>) {
    for child in parent.get_children() {
        if !child.is_in_main_file() {
            continue;
        }
        if is_function_like(child.get_kind()) {
            found.push(child);
        } else if is_scope(&child) {
            collect_function_declarations(&child, found);
        }
    }
}
