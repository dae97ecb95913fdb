extern crate lalrpop;

fn main() {
    println!("cargo:rerun-if-changed=src/surface/grammar.lalrpop");

    lalrpop::Configuration::new()
        .always_use_colors()
        .use_cargo_dir_conventions()
        .process()
        .unwrap();
}
