use script_link::discovery::module_scripts ;

#[test]
fn discovery_finds_inline_modules_in_order() {

	let html = r#"<!doctype html>
		<html>
		<head>
			<script type="module">export const first = 1;</script>
			<script>var classic = true;</script>
			<script type="text/javascript">var typed = true;</script>
		</head>
		<body>
			<script type='module' defer>
				export const second = 2;
			</script>
		</body>
		</html>
	"#;

	let scripts = module_scripts( html );
	assert_eq!( scripts.len(), 2 );
	assert_eq!( scripts[0], "export const first = 1;" );
	assert_eq!( scripts[1].trim(), "export const second = 2;" );

}

#[test]
fn discovery_matches_without_regard_to_case() {
	let html = "<SCRIPT TYPE=\"MODULE\">a</SCRIPT><Script type = module >b</sCrIpT>";
	assert_eq!( module_scripts( html ), vec![ "a", "b" ]);
}

#[test]
fn discovery_skips_external_and_lookalike_tags() {
	let html = r#"
		<script type="module" src="remote.js"></script>
		<scripts type="module">not a script</scripts>
		<script data-note="a > b" type="module">inline</script>
	"#;
	assert_eq!( module_scripts( html ), vec![ "inline" ]);
}

#[test]
fn discovery_empty_and_unterminated_documents() {
	assert!( module_scripts( "" ).is_empty() );
	assert!( module_scripts( "<p>no scripts</p>" ).is_empty() );
	assert!( module_scripts( "<script type=\"module\">never closed" ).is_empty() );
	assert_eq!( module_scripts( "<script type=\"module\"></script>" ), vec![ "" ]);
}
