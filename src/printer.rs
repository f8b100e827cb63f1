use kaleidrs_front::{
    driver::TopLevelHandler,
    frontend::ast::{Function, Prototype},
};

// Stands in for a backend: reports what was parsed, and with --inspect-tree
// dumps the whole tree too.
pub struct AstPrinter {
    pub inspect_tree: bool,
}

impl AstPrinter {
    fn report<T: std::fmt::Display + std::fmt::Debug>(&self, what: &str, ast: &T) {
        println!("Parsed {what}: {ast}");

        if self.inspect_tree {
            println!("{ast:#?}");
        }
    }
}

impl TopLevelHandler for AstPrinter {
    fn handle_definition(&mut self, function: Function) {
        self.report("a function definition", &function);
    }

    fn handle_extern(&mut self, proto: Prototype) {
        self.report("an extern", &proto);
    }

    fn handle_top_level_expr(&mut self, function: Function) {
        self.report("a top-level expression", &function);
    }
}
