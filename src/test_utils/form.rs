use scraper::{ElementRef, Html, Selector};

#[track_caller]
pub(crate) fn must_get_form(html: &Html) -> ElementRef<'_> {
    html.select(&Selector::parse("form").unwrap())
        .next()
        .expect("No form found")
}

#[track_caller]
pub(crate) fn assert_hx_endpoint(form: &ElementRef<'_>, endpoint: &str, attribute: &str) {
    let got = form
        .value()
        .attr(attribute)
        .unwrap_or_else(|| panic!("{attribute} attribute missing"));

    assert_eq!(
        got, endpoint,
        "want form with attribute {attribute}=\"{endpoint}\", got {got:?}"
    );
}

#[track_caller]
pub(crate) fn assert_form_input(form: &ElementRef<'_>, name: &str, type_: &str) {
    for input in form.select(&Selector::parse("input").unwrap()) {
        if input.value().attr("name").unwrap_or_default() != name {
            continue;
        }

        let input_type = input.value().attr("type").unwrap_or_default();
        assert_eq!(
            input_type, type_,
            "want input \"{name}\" with type \"{type_}\", got {input_type:?}"
        );

        return;
    }

    panic!("No input found with name \"{name}\" and type \"{type_}\"");
}

#[track_caller]
pub(crate) fn assert_form_select_with_option(form: &ElementRef<'_>, name: &str, option_value: &str) {
    let select = form
        .select(&Selector::parse("select").unwrap())
        .find(|select| select.value().attr("name").unwrap_or_default() == name)
        .unwrap_or_else(|| panic!("No select found with name \"{name}\""));

    let has_option = select
        .select(&Selector::parse("option").unwrap())
        .any(|option| option.value().attr("value").unwrap_or_default() == option_value);

    assert!(
        has_option,
        "want select \"{name}\" to contain an option with value \"{option_value}\""
    );
}

#[track_caller]
pub(crate) fn assert_form_submit_button(form: &ElementRef<'_>) {
    let submit_button = form
        .select(&Selector::parse("button").unwrap())
        .next()
        .expect("No button found");

    assert_eq!(
        submit_button.value().attr("type").unwrap_or_default(),
        "submit",
        "want submit button with type=\"submit\""
    );
}

#[track_caller]
pub(crate) fn assert_form_error_message(form: &ElementRef<'_>, want_error_message: &str) {
    let paragraph = Selector::parse("p").unwrap();
    let error_message = form
        .select(&paragraph)
        .next()
        .expect("No error message found")
        .text()
        .collect::<Vec<_>>()
        .join("");

    assert_eq!(want_error_message, error_message.trim());
}
