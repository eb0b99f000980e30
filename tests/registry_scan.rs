// End-to-end tests for registry scanning

use declscan::registry::FeatureKind;
use declscan::symbols::{CanonicalType, Scalar};
use declscan::{parse_registry, ScanConfig, ScanError};

const REGISTRY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<registry>
    <comment>Test registry</comment>
    <enums namespace="GL" group="AttribMask" type="bitmask">
        <enum value="0x00000100" name="GL_DEPTH_BUFFER_BIT"/>
        <enum value="0x00004000" name="GL_COLOR_BUFFER_BIT"/>
    </enums>
    <enums namespace="GL" start="0x0000" end="0x7FFF">
        <enum value="0xFFFFFFFF" name="GL_INVALID_INDEX"/>
        <enum value="0xFFFFFFFFFFFFFFFF" name="GL_TIMEOUT_IGNORED"/>
        <enum value="-1" name="GL_ALL_SHADER_BITS_SIGNED"/>
    </enums>
    <commands namespace="GL">
        <command>
            <proto>void <name>glClear</name></proto>
            <param group="ClearBufferMask"><ptype>GLbitfield</ptype> <name>mask</name></param>
        </command>
        <command>
            <proto>const <ptype>GLubyte</ptype> *<name>glGetString</name></proto>
            <param><ptype>GLenum</ptype> <name>name</name></param>
        </command>
        <command>
            <proto>void <name>glShaderSource</name></proto>
            <param><ptype>GLuint</ptype> <name>shader</name></param>
            <param><ptype>GLsizei</ptype> <name>count</name></param>
            <param>const <ptype>GLchar</ptype> *const*<name>string</name></param>
            <param>const <ptype>GLint</ptype> *<name>length</name></param>
        </command>
        <command>
            <proto>void <name>glDebugMessageCallbackARB</name></proto>
            <param><ptype>GLDEBUGPROCARB</ptype> <name>callback</name></param>
            <param>const void *<name>userParam</name></param>
        </command>
    </commands>
    <feature api="gl" name="GL_VERSION_1_0" number="1.0">
        <require>
            <enum name="GL_DEPTH_BUFFER_BIT"/>
            <enum name="GL_COLOR_BUFFER_BIT"/>
            <command name="glClear"/>
            <command name="glGetString"/>
            <command name="glNotInThePool"/>
        </require>
    </feature>
    <feature api="gles2" name="GL_ES_VERSION_2_0" number="2.0">
        <require>
            <enum name="GL_COLOR_BUFFER_BIT"/>
            <command name="glClear"/>
            <command name="glShaderSource"/>
        </require>
    </feature>
    <extensions>
        <extension name="GL_ARB_debug_output" supported="gl|glcore">
            <require>
                <command name="glDebugMessageCallbackARB"/>
            </require>
        </extension>
        <extension name="GL_ARB_uniform_buffer_object" supported="gl|glcore">
            <require>
                <enum name="GL_INVALID_INDEX"/>
            </require>
        </extension>
        <extension name="GL_OES_mapbuffer" supported="gles1|gles2"/>
    </extensions>
</registry>
"#;

const ALIASES: &str = r#"
[aliases]
GLbitfield = "u32"
GLenum = "u32"
GLuint = "u32"
GLint = "i32"
GLsizei = "i32"
GLubyte = "u8"
GLchar = "u8"
"#;

fn config() -> ScanConfig {
    ScanConfig::from_toml(ALIASES).unwrap()
}

#[test]
fn test_features_in_document_order() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let names: Vec<_> = registry.features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "GL_VERSION_1_0",
            "GL_ES_VERSION_2_0",
            "GL_ARB_debug_output",
            "GL_ARB_uniform_buffer_object",
            "GL_OES_mapbuffer",
        ]
    );

    let kinds: Vec<_> = registry.features.iter().map(|f| f.kind).collect();
    assert_eq!(&kinds[..2], &[FeatureKind::Feature, FeatureKind::Feature]);
    assert!(kinds[2..].iter().all(|k| *k == FeatureKind::Extension));

    let embedded: Vec<_> = registry.features.iter().map(|f| f.embedded).collect();
    assert_eq!(embedded, vec![false, true, false, false, true]);
}

#[test]
fn test_missing_command_silently_omitted() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let gl10 = &registry.features[0];
    assert!(gl10.symbols.function("glNotInThePool").is_none());
    assert_eq!(gl10.symbols.functions().len(), 2);
    assert_eq!(gl10.symbols.constants().len(), 2);
}

#[test]
fn test_features_have_independent_namespaces() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let clear_gl = registry.features[0].symbols.function("glClear").unwrap();
    let clear_es = registry.features[1].symbols.function("glClear").unwrap();
    assert_eq!(clear_gl, clear_es);
    assert_eq!(
        clear_gl.signature.param("mask").unwrap().param_type,
        CanonicalType::scalar(Scalar::U32)
    );
}

#[test]
fn test_command_types_resolved() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let es = &registry.features[1];
    let source = es.symbols.function("glShaderSource").unwrap();
    let string = source.signature.param("@string").unwrap();
    assert_eq!(
        string.param_type,
        CanonicalType::scalar(Scalar::U8).with_pointer_depth(2)
    );
    assert_eq!(
        source.signature.param("length").unwrap().param_type,
        CanonicalType::scalar(Scalar::I32).with_pointer()
    );

    let gl10 = &registry.features[0];
    let get = gl10.symbols.function("glGetString").unwrap();
    assert_eq!(get.signature.return_type, CanonicalType::scalar(Scalar::U8).with_pointer());
}

#[test]
fn test_unknown_command_types_reported() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    assert_eq!(registry.pool.unknown_types(), ["GLDEBUGPROCARB".to_string()]);

    let debug = registry.features[2]
        .symbols
        .function("glDebugMessageCallbackARB")
        .unwrap();
    assert_eq!(
        debug.signature.param("callback").unwrap().param_type,
        CanonicalType::pointer_sized()
    );
}

#[test]
fn test_unknown_types_reach_feature_output() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let debug_output = registry.features[2].snapshot();
    assert_eq!(debug_output.symbols.unknown_types, vec!["GLDEBUGPROCARB".to_string()]);

    let json = serde_json::to_value(&debug_output).unwrap();
    assert_eq!(json["unknown_types"][0], "GLDEBUGPROCARB");

    assert!(registry.features[0].snapshot().symbols.unknown_types.is_empty());
}

#[test]
fn test_enum_widths() {
    let registry = parse_registry(REGISTRY, &config()).unwrap();
    let pool = &registry.pool;
    assert_eq!(
        pool.constant("GL_INVALID_INDEX").unwrap().const_type,
        CanonicalType::scalar(Scalar::U32)
    );
    assert_eq!(
        pool.constant("GL_TIMEOUT_IGNORED").unwrap().const_type,
        CanonicalType::scalar(Scalar::U64)
    );
    assert_eq!(pool.constant("GL_ALL_SHADER_BITS_SIGNED").unwrap().value, "-1");
}

#[test]
fn test_extension_glob_filter() {
    let mut config = config();
    config.features = Some(vec!["GL_VERSION_1_0".to_string()]);
    config.extensions = Some(vec!["GL_ARB_*".to_string()]);

    let registry = parse_registry(REGISTRY, &config).unwrap();
    let names: Vec<_> = registry.features.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["GL_VERSION_1_0", "GL_ARB_debug_output", "GL_ARB_uniform_buffer_object"]
    );
}

#[test]
fn test_malformed_registry_is_fatal() {
    let result = parse_registry("<registry><feature name=\"x\"></registry>", &config());
    assert!(matches!(result, Err(ScanError::Registry(_))));
}
