use wikisearch_core::SearchOutcome;

/// Turn a ranked result into the search results page: the echoed query in
/// the search form, a result count with the elapsed seconds, and one link
/// per document URL.
pub fn results_page(query: &str, outcome: &SearchOutcome) -> String {
    let mut page = String::from(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\" />\n\
         <title>WikiSearch</title>\n\
         <link rel=\"stylesheet\" href=\"/css/style.css\" />\n\
         </head>\n\
         <body>\n\
         <article class=\"wikisearch\">\n\
         <div class=\"title\"><a href=\"/\">WikiSearch</a></div>\n",
    );

    page.push_str(&format!(
        "<div class=\"search\">\n\
         <form action=\"/search\" method=\"get\">\n\
         <input type=\"text\" name=\"q\" value=\"{}\" autofocus>\n\
         </form>\n\
         </div>\n",
        escape_html(query)
    ));

    page.push_str(&format!(
        "<div class=\"results\">{} results ({:.6} seconds):</div>\n",
        outcome.docs.len(),
        outcome.elapsed.as_secs_f64()
    ));
    for doc in &outcome.docs {
        let url = escape_html(&doc.url);
        page.push_str(&format!(
            "<div class=\"result\"><a href=\"{url}\">{url}</a></div>\n"
        ));
    }

    page.push_str("</article>\n</body>\n</html>\n");
    page
}

// The query is raw user input and URLs come from arbitrary file names;
// neither may reach the page unescaped.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
