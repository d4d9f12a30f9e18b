//! Python keyword layer over [`Module`].

use std::{cell::RefCell, rc::Rc};

use indexmap::{IndexMap, IndexSet};
use scribe_core::{
    Format, Indent, Join, Module, ModuleOptions, Newline, Piece, Result, ScopeGuard, Token,
};
use tracing::trace;

use crate::{
    call::{Caller, ExplodedCall, single_line},
    imports::FromImport,
};

#[derive(Debug, Default)]
struct ImportState {
    from: IndexMap<String, FromImport>,
    imported: IndexSet<String>,
}

/// Builder for Python source.
///
/// Block forms (`def_`, `if_`, `class_`, ...) write their header line and
/// return a [`ScopeGuard`]; the block body is whatever is appended while the
/// guard is alive.
///
/// # Example
///
/// ```
/// use scribe_python::PythonModule;
///
/// let m = PythonModule::new();
/// {
///     let _def = m.def_("greet", "name");
///     m.return_("f\"hello {name}\"");
/// }
/// m.stmt("greet('you')");
///
/// assert_eq!(
///     m.render().unwrap(),
///     "def greet(name):\n    return f\"hello {name}\"\n\n\ngreet('you')"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct PythonModule {
    inner: Module,
    imports: Rc<RefCell<ImportState>>,
    sorted_imports: bool,
}

impl PythonModule {
    /// Create a new PythonModule with 4-space indentation and width 100.
    pub fn new() -> Self {
        Self::with_options(ModuleOptions::new().with_indent(Indent::PYTHON))
    }

    pub fn with_options(options: ModuleOptions) -> Self {
        Self::from_module(Module::with_options(options))
    }

    /// Wrap an existing module handle.
    pub fn from_module(inner: Module) -> Self {
        Self {
            inner,
            imports: Rc::default(),
            sorted_imports: false,
        }
    }

    /// Sort the names of multi-line `from` imports created from now on,
    /// here and in submodules created later.
    pub fn with_sorted_imports(mut self, sorted: bool) -> Self {
        self.sorted_imports = sorted;
        self
    }

    pub fn module(&self) -> &Module {
        &self.inner
    }

    pub fn width(&self) -> usize {
        self.inner.options().width
    }

    pub fn render(&self) -> Result<String> {
        self.inner.render()
    }

    // =========================================================================
    // Core passthrough
    // =========================================================================

    pub fn stmt(&self, value: impl Into<Token>) -> Module {
        self.inner.stmt(value)
    }

    pub fn append(&self, token: impl Into<Token>) {
        self.inner.append(token);
    }

    /// Blank line; two of them when at top level.
    pub fn sep(&self) {
        self.inner.append(Newline::Separator);
    }

    pub fn scope(&self) -> ScopeGuard<'_> {
        self.inner.scope()
    }

    /// Reserve a position; the submodule tracks its own imports.
    pub fn submodule(&self, initial: impl Into<Token>) -> PythonModule {
        Self::from_module(self.inner.submodule(initial)).with_sorted_imports(self.sorted_imports)
    }

    pub fn insert_before(&self, value: impl Into<Token>) {
        self.inner.insert_before(value);
    }

    pub fn insert_after(&self, value: impl Into<Token>) {
        self.inner.insert_after(value);
    }

    pub fn unnewline(&self) -> bool {
        self.inner.unnewline()
    }

    fn block(&self, header: impl Into<Token>) -> ScopeGuard<'_> {
        self.inner.stmt(header);
        self.inner.scope()
    }

    fn definition(&self, header: impl Into<Token>) -> ScopeGuard<'_> {
        self.inner.stmt(header);
        self.inner.scope_with_trailer(Newline::Separator)
    }

    // =========================================================================
    // Definitions
    // =========================================================================

    /// `def name(params):`, followed by a separator once the block closes.
    pub fn def_(&self, name: impl Into<Piece>, params: impl Into<Piece>) -> ScopeGuard<'_> {
        self.definition(Format::new("def {}({}):").arg(name).arg(params))
    }

    /// `def name(params) -> ret:`
    pub fn def_returning(
        &self,
        name: impl Into<Piece>,
        params: impl Into<Piece>,
        return_type: impl Into<Piece>,
    ) -> ScopeGuard<'_> {
        self.definition(
            Format::new("def {}({}) -> {}:")
                .arg(name)
                .arg(params)
                .arg(return_type),
        )
    }

    /// `def name(self, params):`
    pub fn method(&self, name: impl Into<Piece>, params: impl Into<Piece>) -> ScopeGuard<'_> {
        let params = Join::new(", ", [Piece::from("self"), params.into()]).trim_empty();
        self.def_(name, params)
    }

    /// `class Name(bases):`, or `class Name:` without bases.
    pub fn class_<I>(&self, name: impl Into<Piece>, bases: I) -> ScopeGuard<'_>
    where
        I: IntoIterator,
        I::Item: Into<Piece>,
    {
        let bases = Join::new(", ", bases).trim_empty();
        if bases.is_empty() {
            self.definition(Format::new("class {}:").arg(name))
        } else {
            self.definition(Format::new("class {}({}):").arg(name).arg(bases))
        }
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    pub fn if_(&self, cond: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("if {}:").arg(cond))
    }

    pub fn unless(&self, cond: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("if not ({}):").arg(cond))
    }

    pub fn elif_(&self, cond: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("elif {}:").arg(cond))
    }

    pub fn else_(&self) -> ScopeGuard<'_> {
        self.block("else:")
    }

    pub fn for_(&self, var: impl Into<Piece>, iterable: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(
            Format::new("for {var} in {iterable}:")
                .named("var", var)
                .named("iterable", iterable),
        )
    }

    pub fn while_(&self, cond: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("while {}:").arg(cond))
    }

    pub fn with_(&self, expr: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("with {}:").arg(expr))
    }

    pub fn with_as(&self, expr: impl Into<Piece>, name: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("with {} as {}:").arg(expr).arg(name))
    }

    pub fn try_(&self) -> ScopeGuard<'_> {
        self.block("try:")
    }

    pub fn except_(&self, expr: impl Into<Piece>) -> ScopeGuard<'_> {
        self.block(Format::new("except {}:").arg(expr))
    }

    /// Bare `except:`.
    pub fn except_all(&self) -> ScopeGuard<'_> {
        self.block("except:")
    }

    pub fn finally_(&self) -> ScopeGuard<'_> {
        self.block("finally:")
    }

    /// `if __name__ == "__main__":`
    pub fn main(&self) -> ScopeGuard<'_> {
        self.if_("__name__ == \"__main__\"")
    }

    // =========================================================================
    // Simple statements
    // =========================================================================

    pub fn return_(&self, expr: impl Into<Piece>) -> Module {
        self.stmt(Format::new("return {}").arg(expr))
    }

    pub fn yield_(&self, expr: impl Into<Piece>) -> Module {
        self.stmt(Format::new("yield {}").arg(expr))
    }

    pub fn raise_(&self, expr: impl Into<Piece>) -> Module {
        self.stmt(Format::new("raise {}").arg(expr))
    }

    pub fn pass_(&self) -> Module {
        self.stmt("pass")
    }

    pub fn break_(&self) -> Module {
        self.stmt("break")
    }

    pub fn continue_(&self) -> Module {
        self.stmt("continue")
    }

    /// Triple-quoted docstring, one statement per line of `doc`.
    pub fn docstring(&self, doc: &str) {
        self.stmt("\"\"\"");
        for line in doc.split('\n') {
            self.stmt(line);
        }
        self.stmt("\"\"\"");
    }

    // =========================================================================
    // Imports
    // =========================================================================

    /// `import name`, written at most once per module handle.
    pub fn import_(&self, name: &str) {
        if self.imports.borrow_mut().imported.insert(name.to_string()) {
            self.stmt(format!("import {}", name));
        }
    }

    /// `import name as alias`, written at most once per module handle.
    pub fn import_as(&self, name: &str, alias: &str) {
        let line = format!("import {} as {}", name, alias);
        if self.imports.borrow_mut().imported.insert(line.clone()) {
            self.stmt(line);
        }
    }

    /// `from module import names`.
    ///
    /// The first call for a module reserves the statement's position; later
    /// calls for the same module, and the returned handle, add to it.
    pub fn from_<I>(&self, module: &str, names: I) -> FromImport
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let existing = self.imports.borrow().from.get(module).cloned();
        if let Some(import) = existing {
            import.extend(names);
            return import;
        }

        let mut import = FromImport::new(module, names);
        if self.sorted_imports {
            import = import.sorted();
        }
        self.inner.submodule_inline(import.token());
        self.imports
            .borrow_mut()
            .from
            .insert(module.to_string(), import.clone());
        import
    }

    // =========================================================================
    // Calls
    // =========================================================================

    /// `name(args)` on one line, or one argument per line when the single
    /// line form is wider than the configured width.
    ///
    /// Measuring renders the arguments, so their values are fixed from this
    /// point on.
    pub fn call<I>(&self, name: impl Into<Piece>, args: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Piece>,
    {
        let name = name.into();
        let args: Vec<Piece> = args.into_iter().map(Into::into).collect();
        let measured = single_line(&name, &args).value()?.chars().count();
        let wrap = !args.is_empty() && measured > self.width();
        trace!(measured, width = self.width(), wrap, "call layout");

        if wrap {
            self.inner.append(Token::expandable(ExplodedCall { name, args }));
        } else {
            self.inner.stmt(single_line(&name, &args));
        }
        Ok(())
    }

    /// Collect a call's arguments in `f`, then write it like [`call`](Self::call).
    ///
    /// # Example
    ///
    /// ```
    /// use scribe_python::PythonModule;
    ///
    /// let m = PythonModule::new();
    /// m.hugecall("setup", |c| {
    ///     c.kwarg("name", "'scribe'");
    ///     c.kwarg("version", "'0.3.0'");
    /// })
    /// .unwrap();
    /// assert_eq!(m.render().unwrap(), "setup(name='scribe', version='0.3.0')");
    /// ```
    pub fn hugecall<T>(
        &self,
        name: impl Into<Piece>,
        f: impl FnOnce(&mut Caller) -> T,
    ) -> Result<T> {
        let mut caller = Caller::new(name.into());
        let result = f(&mut caller);
        let (name, args) = caller.into_parts();
        self.call(name, args)?;
        Ok(result)
    }
}

impl Default for PythonModule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use scribe_core::{ArgsAndKwargs, ArgumentList, KeywordList};

    use super::*;

    fn at_indent() -> PythonModule {
        PythonModule::with_options(ModuleOptions::new().with_indent("@"))
    }

    fn lines(m: &PythonModule) -> Vec<String> {
        m.render().unwrap().split('\n').map(String::from).collect()
    }

    #[test]
    fn test_from_statement() {
        let m = at_indent();
        m.from_("foo", ["a", "b"]);
        m.from_("boo", ["x"]);
        m.from_("foo", ["c"]);
        assert_eq!(
            lines(&m),
            ["from foo import (", "@a,", "@b,", "@c,", ")", "from boo import x"]
        );
    }

    #[test]
    fn test_from_statement_handle_added_late() {
        let m = at_indent();
        let import = m.from_("foo", ["a"]);
        m.stmt("a()");
        import.add("b");
        import.add("c");
        import.add("a");
        assert_eq!(
            lines(&m),
            ["from foo import (", "@a,", "@b,", "@c,", ")", "a()"]
        );
    }

    #[test]
    fn test_from_statement_single() {
        let m = at_indent();
        m.from_("foo", ["a"]);
        assert_eq!(m.render().unwrap(), "from foo import a");
    }

    #[test]
    fn test_import_deduplicated() {
        let m = PythonModule::new();
        m.import_("os");
        m.import_("sys");
        m.import_("os");
        m.import_as("numpy", "np");
        m.import_as("numpy", "np");
        assert_eq!(m.render().unwrap(), "import os\nimport sys\nimport numpy as np");
    }

    #[test]
    fn test_short_call() {
        let m = at_indent();
        m.call("f", ["x", "y", "z='foo'"]).unwrap();
        assert_eq!(m.render().unwrap(), "f(x, y, z='foo')");
    }

    #[test]
    fn test_long_long_call() {
        let m = at_indent();
        m.call(
            "SomeLongNameClass",
            [
                "x",
                "y",
                "long long argument 0",
                "long long argument 1",
                "long long argument 2",
                "long long argument 3",
            ],
        )
        .unwrap();
        assert_eq!(
            lines(&m),
            [
                "SomeLongNameClass(",
                "@x,",
                "@y,",
                "@long long argument 0,",
                "@long long argument 1,",
                "@long long argument 2,",
                "@long long argument 3)",
            ]
        );
    }

    #[test]
    fn test_call_at_exact_width_stays_single_line() {
        let m = PythonModule::with_options(ModuleOptions::new().with_width(7));
        m.call("f", ["a", "b"]).unwrap();
        m.call("g", ["a", "bc"]).unwrap();
        assert_eq!(m.render().unwrap(), "f(a, b)\ng(\n    a,\n    bc)");
    }

    #[test]
    fn test_call_without_arguments_never_wraps() {
        let m = PythonModule::with_options(ModuleOptions::new().with_width(2));
        m.call("very_long_function_name", Vec::<Piece>::new()).unwrap();
        assert_eq!(m.render().unwrap(), "very_long_function_name()");
    }

    #[test]
    fn test_call_measures_arguments_once() {
        let m = PythonModule::with_options(ModuleOptions::new().with_width(10));
        let arg = Join::new(", ", ["x"]);
        m.call("f", [&arg]).unwrap();
        arg.push("a_very_long_argument");
        assert_eq!(m.render().unwrap(), "f(x)");
    }

    #[test]
    fn test_def_with_typed() {
        let m = PythonModule::new();
        let params = ArgsAndKwargs::new(
            ArgumentList::new(["x"]).typed("x", "int"),
            KeywordList::new([("y", "0")]).typed("y", "int"),
        );
        {
            let _def = m.def_returning("sum", &params, "int");
            m.return_("x + y");
        }
        assert_eq!(
            m.render().unwrap(),
            "def sum(x: int, y: int = 0) -> int:\n    return x + y"
        );
    }

    #[test]
    fn test_def_params_added_after_body() {
        let m = PythonModule::new();
        let params = ArgsAndKwargs::empty();
        {
            let _def = m.def_("sum", &params);
            m.return_("x + y");
        }
        params.push("x");
        assert_eq!(m.render().unwrap(), "def sum(x):\n    return x + y");
    }

    #[test]
    fn test_method_empty_params() {
        let m = PythonModule::new();
        {
            let _def = m.method("sum", ArgsAndKwargs::empty());
            m.return_("x + y");
        }
        assert_eq!(m.render().unwrap(), "def sum(self):\n    return x + y");
    }

    #[test]
    fn test_method_params_added_after_body() {
        let m = PythonModule::new();
        let params = ArgsAndKwargs::empty();
        {
            let _def = m.method("sum", &params);
            m.return_("x + y");
        }
        params.push("x");
        assert_eq!(m.render().unwrap(), "def sum(self, x):\n    return x + y");
    }

    #[test]
    fn test_class_with_and_without_bases() {
        let m = at_indent();
        {
            let _class = m.class_("A", Vec::<Piece>::new());
            m.pass_();
        }
        {
            let _class = m.class_("B", ["A", "Generic[T]"]);
            let _def = m.method("run", "");
            m.pass_();
        }
        assert_eq!(
            lines(&m),
            [
                "class A:",
                "@pass",
                "",
                "",
                "class B(A, Generic[T]):",
                "@def run(self):",
                "@@pass",
            ]
        );
    }

    #[test]
    fn test_if_elif_else() {
        let m = at_indent();
        {
            let _if = m.if_("x > 0");
            m.return_("1");
        }
        {
            let _elif = m.elif_("x < 0");
            m.return_("-1");
        }
        {
            let _else = m.else_();
            m.return_("0");
        }
        assert_eq!(
            lines(&m),
            ["if x > 0:", "@return 1", "elif x < 0:", "@return -1", "else:", "@return 0"]
        );
    }

    #[test]
    fn test_loops_and_handlers() {
        let m = at_indent();
        {
            let _for = m.for_("i", "range(3)");
            let _unless = m.unless("i");
            m.continue_();
        }
        {
            let _while = m.while_("True");
            let _try = m.try_();
            m.break_();
        }
        {
            let _except = m.except_("ValueError as e");
            m.raise_("e");
        }
        {
            let _finally = m.finally_();
            let _with = m.with_as("open(p)", "f");
            m.yield_("f");
        }
        assert_eq!(
            lines(&m),
            [
                "for i in range(3):",
                "@if not (i):",
                "@@continue",
                "while True:",
                "@try:",
                "@@break",
                "except ValueError as e:",
                "@raise e",
                "finally:",
                "@with open(p) as f:",
                "@@yield f",
            ]
        );
    }

    #[test]
    fn test_docstring_and_main() {
        let m = at_indent();
        m.docstring("Module doc.\n\nMore.");
        {
            let _main = m.main();
            m.stmt("run()");
        }
        assert_eq!(
            lines(&m),
            [
                "\"\"\"",
                "Module doc.",
                "",
                "More.",
                "\"\"\"",
                "if __name__ == \"__main__\":",
                "@run()",
            ]
        );
    }

    #[test]
    fn test_definitions_separated_pep8_style() {
        let m = at_indent();
        {
            let _class = m.class_("A", Vec::<Piece>::new());
            {
                let _def = m.method("a", "");
                m.pass_();
            }
            {
                let _def = m.method("b", "");
                m.pass_();
            }
        }
        m.stmt("x = A()");
        assert_eq!(
            lines(&m),
            [
                "class A:",
                "@def a(self):",
                "@@pass",
                "",
                "@def b(self):",
                "@@pass",
                "",
                "",
                "x = A()",
            ]
        );
    }

    #[test]
    fn test_hugecall_wraps_when_wide() {
        let m = PythonModule::with_options(ModuleOptions::new().with_width(30));
        let count = m
            .hugecall("Config", |c| {
                c.arg("path");
                c.kwarg("encoding", "'utf-8'");
                c.kwarg("strict", "True");
                c.len()
            })
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            m.render().unwrap(),
            "Config(\n    path,\n    encoding='utf-8',\n    strict=True)"
        );
    }

    #[test]
    fn test_sorted_imports_inherited_by_submodule() {
        let m = at_indent().with_sorted_imports(true);
        let header = m.submodule("");
        header.from_("typing", ["Optional", "Any"]);
        m.from_("os", ["path", "environ"]);
        assert_eq!(
            lines(&m),
            [
                "from typing import (",
                "@Any,",
                "@Optional,",
                ")",
                "from os import (",
                "@environ,",
                "@path,",
                ")",
            ]
        );
    }

    #[test]
    fn test_submodule_keeps_own_imports() {
        let m = PythonModule::new();
        let header = m.submodule("");
        m.stmt("x = 1");
        header.import_("os");
        m.import_("os");
        assert_eq!(m.render().unwrap(), "import os\nx = 1\nimport os");
    }
}
