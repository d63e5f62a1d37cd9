mod extraction_tests;
mod text_parser_tests;
