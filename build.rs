//! Generates the problem registry from `problems/`.
//!
//! Every `problems/pNNN.rs` becomes a module plus a registry entry carrying its id and the
//! first line of its `//!` header, which `lazyset list` prints.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

struct Problem {
    number: u32,
    id: String,
    path: PathBuf,
    about: String,
}

fn main() {
    let dir = Path::new("problems");
    println!("cargo:rerun-if-changed={}", dir.display());

    let mut problems: Vec<Problem> = fs::read_dir(dir)
        .expect("problems/ is readable")
        .filter_map(|entry| scan(&entry.expect("problems/ entry").path()))
        .collect();
    problems.sort_by_key(|p| p.number);
    if let Some(w) = problems.windows(2).find(|w| w[0].number == w[1].number) {
        panic!("problem {} is defined twice ({})", w[1].id, w[1].path.display());
    }

    let mut modules = String::new();
    let mut entries = String::new();
    for p in &problems {
        println!("cargo:rerun-if-changed={}", p.path.display());
        let path = fs::canonicalize(&p.path).expect("problem path resolves");
        modules.push_str(&format!("#[path = {:?}]\npub mod {};\n", path, p.id));
        entries.push_str(&format!(
            "    Entry {{ id: {:?}, about: {:?}, solve: problems::{}::solve }},\n",
            p.id, p.about, p.id
        ));
    }
    let registry = format!("pub static REGISTRY: &[Entry] = &[\n{entries}];\n");

    let out = PathBuf::from(env::var("OUT_DIR").expect("cargo sets OUT_DIR"));
    write_if_changed(&out.join("problems_mod.rs"), &modules);
    write_if_changed(&out.join("registry.rs"), &registry);
}

/// `Some` for files named `p` followed by digits, with `.rs` extension.
fn scan(path: &Path) -> Option<Problem> {
    if path.extension()? != "rs" {
        return None;
    }
    let id = path.file_stem()?.to_str()?.to_owned();
    let number = id.strip_prefix('p')?.parse().ok()?;
    let source = fs::read_to_string(path).expect("problem file is readable");
    let about = source
        .lines()
        .find_map(|l| l.strip_prefix("//!"))
        .map(|l| l.trim().to_owned())
        .unwrap_or_default();
    Some(Problem {
        number,
        id,
        path: path.to_owned(),
        about,
    })
}

fn write_if_changed(path: &Path, contents: &str) {
    if fs::read_to_string(path).ok().as_deref() != Some(contents) {
        fs::write(path, contents).expect("OUT_DIR is writable");
    }
}
