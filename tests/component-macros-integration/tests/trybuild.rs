//! trybuild 编译测试

#[test]
fn test_derive_compiles() {
    let t = trybuild::TestCases::new();
    t.pass("tests/trybuild/component_ok.rs");
}
