use ta2sw_lang::{split_statements, Statement};

pub fn run(algorithm: &str) -> Result<(), String> {
    for statement in split_statements(algorithm) {
        println!("{}", render_statement(&statement));
    }
    Ok(())
}

fn render_statement(statement: &Statement) -> String {
    format!("{}: {} = {}", statement.order, statement.name, statement.raw_expression)
}
