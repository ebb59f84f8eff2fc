#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// body(1) > ul.tasks(2) > li.task(3..5), div.toolbar(6) > button.btn(7),
/// div.picker(8) > button.btn(9)
pub const TASKS_PAGE: &str = r#"{
    "tag": "body",
    "children": [
        { "tag": "ul", "attrs": { "class": "tasks" }, "children": [
            { "tag": "li", "attrs": { "class": "task" }, "text": "Write" },
            { "tag": "li", "attrs": { "class": "task" }, "text": "Test" },
            { "tag": "li", "attrs": { "class": "task done" }, "text": "Ship" }
        ] },
        { "tag": "div", "attrs": { "class": "toolbar" }, "children": [
            { "tag": "button", "attrs": { "class": "btn" }, "text": "Add" }
        ] },
        { "tag": "div", "attrs": { "class": "picker" }, "children": [
            { "tag": "button", "attrs": { "class": "btn" }, "text": "Pick" }
        ] }
    ]
}"#;

pub fn write_page(dir: &Path) -> PathBuf {
    let path = dir.join("page.json");
    std::fs::write(&path, TASKS_PAGE).expect("write fixture");
    path
}
