//! Schema inference and extraction tests

use xml_schema_inference::document::Document;
use xml_schema_inference::inference::{
    AttributeMode, ColumnSource, EmptyElementPolicy, NamespaceMode, OpaqueMode, ResolvedType,
    ScalarKind, SchemaError, SchemaFallback, SchemaInferrer, SchemaOptions, StructField,
};
use xml_schema_inference::{
    Value, extract_data, extract_data_with_schema, infer_schema, rows_to_json,
};

fn parse(xml: &str) -> Document {
    Document::parse(xml).unwrap()
}

fn string(s: &str) -> Value {
    Value::String(s.to_string())
}

fn names(document: &Document, options: &SchemaOptions) -> Vec<String> {
    infer_schema(document, options)
        .into_iter()
        .map(|c| c.name)
        .collect()
}

mod end_to_end_tests {
    use super::*;

    #[test]
    fn test_simple_records() {
        let document = parse(
            "<root><item><name>Alice</name><age>30</age></item>\
             <item><name>Bob</name><age>25</age></item></root>",
        );
        let options = SchemaOptions::default();

        let columns = infer_schema(&document, &options);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "name");
        assert_eq!(columns[0].column_type, ResolvedType::string());
        assert_eq!(columns[1].name, "age");
        assert_eq!(columns[1].column_type, ResolvedType::Scalar(ScalarKind::Integer));

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![
            vec![string("Alice"), Value::Integer(30)],
            vec![string("Bob"), Value::Integer(25)],
        ]);
    }

    #[test]
    fn test_repeated_children_become_list() {
        let document = parse("<root><item><tag>a</tag><tag>b</tag><tag>c</tag></item></root>");
        let options = SchemaOptions::default();

        let columns = infer_schema(&document, &options);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "tag");
        assert_eq!(
            columns[0].column_type,
            ResolvedType::list_of(ResolvedType::string())
        );

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![Value::List(vec![
            string("a"),
            string("b"),
            string("c")
        ])]]);
    }

    #[test]
    fn test_attribute_and_text_columns() {
        let document = parse(r#"<root><item id="1">x</item><item id="2">y</item></root>"#);
        let options = SchemaOptions::builder()
            .attribute_mode(AttributeMode::Columns)
            .record_path("item")
            .build();

        let columns = infer_schema(&document, &options);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "id");
        assert!(columns[0].is_attribute);
        assert_eq!(columns[0].column_type, ResolvedType::string());
        assert_eq!(columns[1].name, "#text");
        assert_eq!(columns[1].source, ColumnSource::Text);
        assert_eq!(columns[1].column_type, ResolvedType::string());

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![
            vec![string("1"), string("x")],
            vec![string("2"), string("y")],
        ]);
    }

    #[test]
    fn test_rows_as_json() {
        let document = parse(
            r#"<orders>
                <order id="o1">
                    <placed>2024-03-01T09:15:00</placed>
                    <line><sku>A-1</sku><qty>2</qty></line>
                    <line><sku>B-2</sku><qty>5</qty></line>
                </order>
            </orders>"#,
        );
        let options = SchemaOptions::default();
        let columns = infer_schema(&document, &options);
        let column_names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        assert_eq!(column_names, vec!["id", "placed", "line"]);
        assert_eq!(
            columns[1].column_type,
            ResolvedType::Scalar(ScalarKind::Timestamp)
        );

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(
            rows_to_json(&column_names, &rows),
            serde_json::json!([{
                "id": "o1",
                "placed": "2024-03-01T09:15:00",
                "line": [
                    {"sku": "A-1", "qty": 2},
                    {"sku": "B-2", "qty": 5}
                ]
            }])
        );
    }
}

mod property_tests {
    use super::*;

    const CATALOG: &str = r#"<catalog>
        <book id="b1" lang="en">
            <title>Rust</title>
            <price currency="EUR">39.90</price>
            <authors><author>Ann</author><author>Ben</author></authors>
            <published>2023-05-01</published>
        </book>
        <book id="b2">
            <title>XML</title>
            <price currency="USD">12.50</price>
            <authors><author>Cid</author></authors>
        </book>
    </catalog>"#;

    #[test]
    fn test_inference_is_deterministic() {
        let document = parse(CATALOG);
        let options = SchemaOptions::default();
        let first = SchemaInferrer::with_options(options.clone()).infer(&document);
        for _ in 0..5 {
            assert_eq!(
                SchemaInferrer::with_options(options.clone()).infer(&document),
                first
            );
        }
    }

    #[test]
    fn test_explicit_schema_extraction_is_idempotent() {
        let document = parse(CATALOG);
        let options = SchemaOptions::default();
        let schema = SchemaInferrer::with_options(options.clone()).infer(&document);

        let first =
            extract_data_with_schema(&document, &schema.names(), &schema.types(), &options)
                .unwrap();
        let second =
            extract_data_with_schema(&document, &schema.names(), &schema.types(), &options)
                .unwrap();
        assert_eq!(first, second);
        assert_eq!(first, extract_data(&document, &options).unwrap());
    }

    #[test]
    fn test_depth_limit_boundary() {
        let document = parse(CATALOG);
        for depth in [0, 1] {
            let options = SchemaOptions::builder().max_depth(depth).build();
            let schema = SchemaInferrer::with_options(options.clone()).infer(&document);
            assert_eq!(schema.columns.len(), 1);
            assert_eq!(schema.fallback, Some(SchemaFallback::DepthLimit));
            assert_eq!(
                schema.columns[0].column_type,
                ResolvedType::OpaqueDocument(OpaqueMode::FullElement)
            );
        }

        let options = SchemaOptions::builder().max_depth(1).build();
        assert_eq!(names(&document, &options), vec!["book"]);
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows.len(), 2);
        let Value::Document(xml) = &rows[1][0] else {
            panic!("expected serialized record");
        };
        assert!(xml.starts_with(r#"<book id="b2">"#));
        assert!(xml.ends_with("</book>"));
    }

    #[test]
    fn test_negative_depth_uses_ceiling() {
        let mut xml = String::from("<root><r>");
        for level in 1..=12 {
            xml.push_str(&format!("<a{}>", level));
        }
        xml.push('x');
        for level in (1..=12).rev() {
            xml.push_str(&format!("</a{}>", level));
        }
        xml.push_str("</r></root>");
        let document = parse(&xml);

        let struct_levels = |options: &SchemaOptions| {
            let mut levels = 0;
            let mut current = infer_schema(&document, options)[0].column_type.clone();
            while let ResolvedType::Struct(fields) = current {
                levels += 1;
                current = fields[0].field_type.clone();
            }
            (levels, current)
        };

        assert_eq!(
            struct_levels(&SchemaOptions::default()),
            (8, ResolvedType::OpaqueDocument(OpaqueMode::InnerContent))
        );
        assert_eq!(
            struct_levels(&SchemaOptions::builder().max_depth(-1).build()),
            (11, ResolvedType::string())
        );
    }

    #[test]
    fn test_majority_type_rule() {
        let build = |values: &[&str]| {
            let mut xml = String::from("<root>");
            for value in values {
                xml.push_str(&format!("<r><v>{}</v></r>", value));
            }
            xml.push_str("</root>");
            parse(&xml)
        };
        let options = SchemaOptions::default();

        let nine = build(&["10", "11", "12", "13", "14", "15", "16", "17", "18", "abc"]);
        assert_eq!(
            infer_schema(&nine, &options)[0].column_type,
            ResolvedType::Scalar(ScalarKind::Integer)
        );
        let rows = extract_data(&nine, &options).unwrap();
        assert_eq!(rows[0], vec![Value::Integer(10)]);
        assert_eq!(rows[9], vec![string("abc")]);

        let seven = build(&["10", "11", "12", "13", "14", "15", "16", "abc", "def", "ghi"]);
        assert_eq!(
            infer_schema(&seven, &options)[0].column_type,
            ResolvedType::string()
        );
    }

    #[test]
    fn test_list_detection_and_force_list() {
        let document = parse("<root><r><x>a</x><x>b</x><x>c</x><y>d</y></r></root>");
        let columns = infer_schema(&document, &SchemaOptions::default());
        assert!(columns[0].column_type.is_list());
        assert_eq!(columns[1].column_type, ResolvedType::string());

        let forced = SchemaOptions::builder().force_list("y").build();
        let columns = infer_schema(&document, &forced);
        assert_eq!(
            columns[1].column_type,
            ResolvedType::list_of(ResolvedType::string())
        );
        let rows = extract_data(&document, &forced).unwrap();
        assert_eq!(rows[0][1], Value::List(vec![string("d")]));
    }

    #[test]
    fn test_missing_declared_column_is_null() {
        let document = parse("<root><r><a>x</a></r><r><b>y</b></r></root>");
        let names = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let types = vec![
            ResolvedType::string(),
            ResolvedType::string(),
            ResolvedType::Scalar(ScalarKind::Date),
        ];
        let rows =
            extract_data_with_schema(&document, &names, &types, &SchemaOptions::default())
                .unwrap();
        assert_eq!(rows, vec![
            vec![string("x"), Value::Null, Value::Null],
            vec![Value::Null, string("y"), Value::Null],
        ]);
    }

    #[test]
    fn test_schema_mismatch() {
        let document = parse("<root><r/></root>");
        let result = extract_data_with_schema(
            &document,
            &["a".to_string(), "b".to_string()],
            &[ResolvedType::string()],
            &SchemaOptions::default(),
        );
        assert_eq!(result, Err(SchemaError::SchemaMismatch { names: 2, types: 1 }));
    }

    #[test]
    fn test_first_instance_shapes_struct() {
        let document = parse(
            "<root><r><meta><a>1</a></meta></r><r><meta><b>2</b></meta></r></root>",
        );
        let options = SchemaOptions::default();
        let columns = infer_schema(&document, &options);
        assert_eq!(
            columns[0].column_type,
            ResolvedType::Struct(vec![StructField {
                name: "a".to_string(),
                field_type: ResolvedType::Scalar(ScalarKind::Boolean),
                source: Some(ColumnSource::Child),
            }])
        );

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows[1][0], Value::Struct(vec![("a".to_string(), Value::Null)]));
    }

    fn explicit_matches_inferred(xml: &str, options: &SchemaOptions) {
        let document = parse(xml);
        let columns = infer_schema(&document, options);
        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let types: Vec<ResolvedType> = columns.iter().map(|c| c.column_type.clone()).collect();
        assert_eq!(
            extract_data_with_schema(&document, &names, &types, options).unwrap(),
            extract_data(&document, options).unwrap()
        );
    }

    #[test]
    fn test_explicit_schema_matches_depth_limit_fallback() {
        let xml = "<root><item><item>inner</item></item></root>";
        let options = SchemaOptions::builder().max_depth(1).build();
        assert_eq!(extract_data(&parse(xml), &options).unwrap(), vec![vec![
            Value::Document("<item><item>inner</item></item>".to_string())
        ]]);
        explicit_matches_inferred(xml, &options);

        let options = SchemaOptions::builder().max_depth(0).build();
        explicit_matches_inferred("<root><root>x</root></root>", &options);
        explicit_matches_inferred("<root><content/></root>", &SchemaOptions::default());
    }

    #[test]
    fn test_empty_scalar_stays_null_under_empty_object() {
        let document = parse("<root><item><n>1</n></item><item><n/></item></root>");
        let options = SchemaOptions::builder()
            .empty_elements(EmptyElementPolicy::EmptyObject)
            .build();
        let columns = infer_schema(&document, &options);
        assert_eq!(columns[0].column_type, ResolvedType::Scalar(ScalarKind::Boolean));

        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![Value::Boolean(true)], vec![Value::Null]]);
    }
}

mod record_locator_tests {
    use super::*;

    const FEED: &str = r#"<feed>
        <header><title>News</title></header>
        <entries>
            <entry lang="en"><title>One</title></entry>
            <entry lang="de"><title>Zwei</title></entry>
        </entries>
    </feed>"#;

    #[test]
    fn test_root_element() {
        let document = parse(FEED);
        let options = SchemaOptions::builder().root_element("entries").build();
        assert_eq!(names(&document, &options), vec!["lang", "title"]);
        assert_eq!(extract_data(&document, &options).unwrap().len(), 2);
    }

    #[test]
    fn test_record_path_with_predicate() {
        let document = parse(FEED);
        let options = SchemaOptions::builder()
            .record_path("//entry[@lang='de']")
            .build();
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![string("de"), string("Zwei")]]);
    }

    #[test]
    fn test_unmatched_record_path_falls_back() {
        let document = parse(FEED);
        let options = SchemaOptions::builder().record_path("//missing").build();
        let schema = SchemaInferrer::with_options(options.clone()).infer(&document);
        assert_eq!(schema.names(), vec!["content"]);
        assert_eq!(schema.fallback, Some(SchemaFallback::EmptyRecordSet));
        assert!(extract_data(&document, &options).unwrap().is_empty());
    }
}

mod namespace_tests {
    use super::*;

    const XML: &str = r#"<r:root xmlns:r="urn:r" xmlns:m="urn:m">
        <r:item m:kind="a"><r:name>A</r:name></r:item>
    </r:root>"#;

    #[test]
    fn test_strip() {
        let document = parse(XML);
        assert_eq!(names(&document, &SchemaOptions::default()), vec!["kind", "name"]);
    }

    #[test]
    fn test_keep() {
        let document = parse(XML);
        let options = SchemaOptions::builder().namespaces(NamespaceMode::Keep).build();
        assert_eq!(names(&document, &options), vec!["m:kind", "r:name"]);
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![string("a"), string("A")]]);
    }

    #[test]
    fn test_expand() {
        let document = parse(XML);
        let options = SchemaOptions::builder().namespaces(NamespaceMode::Expand).build();
        assert_eq!(names(&document, &options), vec!["{urn:m}kind", "{urn:r}name"]);
    }

    #[test]
    fn test_default_namespace() {
        let document = parse(r#"<root xmlns="urn:d"><item><name>A</name></item></root>"#);
        assert_eq!(names(&document, &SchemaOptions::default()), vec!["name"]);
        let options = SchemaOptions::builder().namespaces(NamespaceMode::Expand).build();
        assert_eq!(names(&document, &options), vec!["{urn:d}name"]);
    }
}

mod attribute_mode_tests {
    use super::*;

    const XML: &str = r#"<root><item sku="A1" qty="3"><name>Pen</name></item></root>"#;

    #[test]
    fn test_prefixed() {
        let document = parse(XML);
        let options = SchemaOptions::builder()
            .attribute_mode(AttributeMode::Prefixed)
            .build();
        assert_eq!(names(&document, &options), vec!["@sku", "@qty", "name"]);
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![string("A1"), string("3"), string("Pen")]]);
    }

    #[test]
    fn test_map() {
        let document = parse(XML);
        let options = SchemaOptions::builder().attribute_mode(AttributeMode::Map).build();
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![
            Value::Map(vec![
                ("sku".to_string(), "A1".to_string()),
                ("qty".to_string(), "3".to_string()),
            ]),
            string("Pen"),
        ]]);
    }

    #[test]
    fn test_discard() {
        let document = parse(XML);
        let options = SchemaOptions::builder()
            .attribute_mode(AttributeMode::Discard)
            .build();
        assert_eq!(names(&document, &options), vec!["name"]);
    }

    #[test]
    fn test_attributed_leaf_becomes_struct() {
        let document = parse(r#"<root><item><price cur="EUR">9.99</price></item></root>"#);
        let options = SchemaOptions::default();
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![Value::Struct(vec![
            ("cur".to_string(), string("EUR")),
            ("#text".to_string(), Value::Double(9.99)),
        ])]]);
    }

    #[test]
    fn test_empty_elements_policy() {
        let document = parse("<root><item><a>x</a></item><item><a/></item></root>");
        let options = SchemaOptions::builder()
            .empty_elements(EmptyElementPolicy::String)
            .build();
        let rows = extract_data(&document, &options).unwrap();
        assert_eq!(rows, vec![vec![string("x")], vec![string("")]]);
    }
}
