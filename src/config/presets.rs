/// Built-in exercises
///
/// The fallback set is used whenever remote aggregation yields nothing
/// usable. Order and content are fixed.
use crate::config::types::{Difficulty, Question, ResultSet, Scalar};
use serde_json::{json, Value};

/// Source name recorded on built-in questions.
pub const BUILTIN_SOURCE: &str = "builtin";

const EMPLOYEES_DDL: &str = "CREATE TABLE employees (
  id INTEGER PRIMARY KEY,
  name TEXT,
  department TEXT,
  salary INTEGER
);
";

const FOUR_EMPLOYEES: &str = "
INSERT INTO employees VALUES (1, 'John Doe', 'Engineering', 75000);
INSERT INTO employees VALUES (2, 'Jane Smith', 'Marketing', 65000);
INSERT INTO employees VALUES (3, 'Bob Johnson', 'Engineering', 80000);
INSERT INTO employees VALUES (4, 'Alice Brown', 'HR', 60000);";

const FIFTH_EMPLOYEE: &str = "
INSERT INTO employees VALUES (5, 'Charlie Wilson', 'Marketing', 70000);";

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn text(s: &str) -> Scalar {
    Scalar::Text(s.to_string())
}

fn employee(id: i64, name: &str, department: &str, salary: i64) -> Vec<Scalar> {
    vec![
        Scalar::Integer(id),
        text(name),
        text(department),
        Scalar::Integer(salary),
    ]
}

/// The four sample questions, ids 1..=4.
pub fn fallback_questions() -> Vec<Question> {
    let four = format!("{EMPLOYEES_DDL}{FOUR_EMPLOYEES}");
    let five = format!("{EMPLOYEES_DDL}{FOUR_EMPLOYEES}{FIFTH_EMPLOYEE}");

    vec![
        Question {
            id: 1,
            title: "Select All Employees".to_string(),
            difficulty: Difficulty::Easy,
            description: "Write a query to select all columns from the employees table."
                .to_string(),
            schema_script: four.clone(),
            expected_result: ResultSet {
                columns: columns(&["id", "name", "department", "salary"]),
                rows: vec![
                    employee(1, "John Doe", "Engineering", 75000),
                    employee(2, "Jane Smith", "Marketing", 65000),
                    employee(3, "Bob Johnson", "Engineering", 80000),
                    employee(4, "Alice Brown", "HR", 60000),
                ],
            },
            hint: "Use SELECT * to select all columns".to_string(),
            source_name: BUILTIN_SOURCE.to_string(),
        },
        Question {
            id: 2,
            title: "Filter by Department".to_string(),
            difficulty: Difficulty::Easy,
            description:
                "Write a query to select names of all employees in the Engineering department."
                    .to_string(),
            schema_script: four,
            expected_result: ResultSet {
                columns: columns(&["name"]),
                rows: vec![vec![text("John Doe")], vec![text("Bob Johnson")]],
            },
            hint: "Use WHERE clause to filter by department".to_string(),
            source_name: BUILTIN_SOURCE.to_string(),
        },
        Question {
            id: 3,
            title: "Average Salary by Department".to_string(),
            difficulty: Difficulty::Medium,
            description: "Write a query to find the average salary for each department. \
                          Order by department name."
                .to_string(),
            schema_script: five.clone(),
            expected_result: ResultSet {
                columns: columns(&["department", "avg_salary"]),
                rows: vec![
                    vec![text("Engineering"), Scalar::Integer(77500)],
                    vec![text("HR"), Scalar::Integer(60000)],
                    vec![text("Marketing"), Scalar::Integer(67500)],
                ],
            },
            hint: "Use GROUP BY with AVG() aggregate function".to_string(),
            source_name: BUILTIN_SOURCE.to_string(),
        },
        Question {
            id: 4,
            title: "Top Earners".to_string(),
            difficulty: Difficulty::Medium,
            description: "Write a query to find employees earning more than $70,000. \
                          Show name and salary, ordered by salary descending."
                .to_string(),
            schema_script: five,
            expected_result: ResultSet {
                columns: columns(&["name", "salary"]),
                rows: vec![
                    vec![text("Bob Johnson"), Scalar::Integer(80000)],
                    vec![text("John Doe"), Scalar::Integer(75000)],
                ],
            },
            hint: "Use WHERE with comparison operator and ORDER BY DESC".to_string(),
            source_name: BUILTIN_SOURCE.to_string(),
        },
    ]
}

/// Authoring template for a new question document.
pub fn question_template() -> Value {
    json!({
        "title": "Question Title",
        "difficulty": "Easy",
        "description": "Describe what the query should accomplish.",
        "schema": "CREATE TABLE example (id INTEGER, name TEXT);\nINSERT INTO example VALUES (1, 'test');",
        "expectedResult": {
            "columns": ["id", "name"],
            "values": [[1, "test"]]
        },
        "hint": "Provide a helpful hint here"
    })
}
