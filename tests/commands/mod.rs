mod support;
mod test_menu;
