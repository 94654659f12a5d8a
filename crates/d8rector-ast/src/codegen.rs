// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Render a tree back to PHP source.
//!
//! The printer produces canonical formatting: four-space indentation,
//! single-quoted strings and long `array(...)` syntax. It is used for
//! reporting and for rule samples, not for preserving original layout.

use crate::nodes::{Callee, MethodName, Node, NodeId, NodeKind};
use crate::tree::Tree;

const INDENT: &str = "    ";

/// Render a whole source unit, opening tag included.
pub fn render(tree: &Tree) -> String {
    let mut printer = Printer::new(tree);
    printer.out.push_str("<?php\n");
    let stmts = tree.stmts(tree.root());
    if !stmts.is_empty() {
        printer.out.push('\n');
    }
    printer.block(&stmts);
    printer.out
}

/// Render one statement or expression.
pub fn render_node(tree: &Tree, id: NodeId) -> String {
    let mut printer = Printer::new(tree);
    if tree.kind(id).is_statement() {
        printer.stmt(id);
        let trimmed = printer.out.trim_end().len();
        printer.out.truncate(trimmed);
        printer.out
    } else {
        printer.expr(id)
    }
}

/// Render a sequence of statements, one per line.
pub fn render_stmts(tree: &Tree, stmts: &[NodeId]) -> String {
    let mut printer = Printer::new(tree);
    printer.block(stmts);
    let trimmed = printer.out.trim_end().len();
    printer.out.truncate(trimmed);
    printer.out
}

/// Quote a string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

struct Printer<'t> {
    tree: &'t Tree,
    out: String,
    depth: usize,
}

impl<'t> Printer<'t> {
    fn new(tree: &'t Tree) -> Self {
        Printer {
            tree,
            out: String::new(),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        if text.is_empty() {
            self.out.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn block(&mut self, stmts: &[NodeId]) {
        for (i, stmt) in stmts.iter().enumerate() {
            let declaration = matches!(
                self.tree.kind(*stmt),
                NodeKind::Function | NodeKind::Class | NodeKind::Trait | NodeKind::ClassMethod
            );
            if i > 0 && declaration {
                self.line("");
            }
            self.stmt(*stmt);
        }
    }

    fn body(&mut self, header: &str, stmts: &[NodeId]) {
        self.line(header);
        self.line("{");
        self.depth += 1;
        self.block(stmts);
        self.depth -= 1;
        self.line("}");
    }

    fn stmt(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.node(id) {
            Node::File { .. } => self.block(&tree.stmts(id)),
            Node::Namespace { name, .. } => {
                match name {
                    Some(name) => self.line(&format!("namespace {};", name)),
                    None => self.line("namespace;"),
                }
                self.line("");
                self.block(&tree.stmts(id));
            }
            Node::Use { uses } => {
                let items: Vec<String> = uses
                    .iter()
                    .map(|item| match &item.alias {
                        Some(alias) => format!("{} as {}", item.name, alias),
                        None => item.name.to_string(),
                    })
                    .collect();
                self.line(&format!("use {};", items.join(", ")));
            }
            Node::Function { name, params, .. } => {
                let header = format!("function {}({})", name, params_list(params));
                self.body(&header, &tree.stmts(id));
            }
            Node::Class { name, extends, .. } => {
                let header = match extends {
                    Some(parent) => format!("class {} extends {}", name, parent.to_code()),
                    None => format!("class {}", name),
                };
                self.body(&header, &tree.stmts(id));
            }
            Node::Trait { name, .. } => {
                self.body(&format!("trait {}", name), &tree.stmts(id));
            }
            Node::TraitUse { traits } => {
                let names: Vec<String> = traits.iter().map(|t| t.to_code()).collect();
                self.line(&format!("use {};", names.join(", ")));
            }
            Node::Property {
                name,
                visibility,
                doc,
            } => {
                if let Some(doc) = doc {
                    for line in doc.lines() {
                        let line = line.trim();
                        if line.starts_with('*') {
                            self.line(&format!(" {}", line));
                        } else {
                            self.line(line);
                        }
                    }
                }
                self.line(&format!("{} ${};", visibility.as_str(), name));
            }
            Node::ClassMethod {
                name,
                visibility,
                is_static,
                params,
                ..
            } => {
                let modifier = if *is_static { " static" } else { "" };
                let header = format!(
                    "{}{} function {}({})",
                    visibility.as_str(),
                    modifier,
                    name,
                    params_list(params)
                );
                self.body(&header, &tree.stmts(id));
            }
            Node::Expression { expr } => {
                let text = self.expr(*expr);
                self.line(&format!("{};", text));
            }
            Node::Return { expr } => match expr {
                Some(expr) => {
                    let text = self.expr(*expr);
                    self.line(&format!("return {};", text));
                }
                None => self.line("return;"),
            },
            Node::Nop => self.line(""),
            _ => {
                let text = self.expr(id);
                self.line(&format!("{};", text));
            }
        }
    }

    fn expr(&self, id: NodeId) -> String {
        let tree = self.tree;
        match tree.node(id) {
            Node::FuncCall { callee, args } => {
                let callee = match callee {
                    Callee::Name(name) => name.to_code(),
                    Callee::Dynamic(expr) => self.expr(*expr),
                };
                format!("{}({})", callee, self.list(args))
            }
            Node::MethodCall { var, name, args } => {
                let name = match name {
                    MethodName::Identifier(name) => name.clone(),
                    MethodName::Dynamic(expr) => format!("{{{}}}", self.expr(*expr)),
                };
                format!("{}->{}({})", self.expr(*var), name, self.list(args))
            }
            Node::StaticCall { class, name, args } => {
                format!("{}::{}({})", class.to_code(), name, self.list(args))
            }
            Node::New { class, args } => format!("new {}({})", class.to_code(), self.list(args)),
            Node::Assign { var, expr } => format!("{} = {}", self.expr(*var), self.expr(*expr)),
            Node::Variable { name } => format!("${}", name),
            Node::PropertyFetch { var, name } => format!("{}->{}", self.expr(*var), name),
            Node::ConstFetch { name } => name.to_code(),
            Node::Str { value } => quote(value),
            Node::Int { value } => value.to_string(),
            Node::Array { items } => format!("array({})", self.list(items)),
            Node::ArrayItem { key, value } => match key {
                Some(key) => format!("{} => {}", self.expr(*key), self.expr(*value)),
                None => self.expr(*value),
            },
            Node::Arg { value, unpack } => {
                let prefix = if *unpack { "..." } else { "" };
                format!("{}{}", prefix, self.expr(*value))
            }
            // Statements never appear in expression position.
            other => format!("/* {} */", other.kind()),
        }
    }

    fn list(&self, ids: &[NodeId]) -> String {
        ids.iter()
            .map(|id| self.expr(*id))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn params_list(params: &[String]) -> String {
    params
        .iter()
        .map(|p| format!("${}", p))
        .collect::<Vec<_>>()
        .join(", ")
}
