use {
    repolink_github::{FetchError, Project, RepoFetcher, repos_url},
    serde_json::json,
    wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    },
};

const AUTH: &str = "bearer abc";

fn repo_json(id: u64) -> serde_json::Value {
    json!({ "id": id, "name": format!("repo-{id}"), "full_name": format!("octo/repo-{id}") })
}

fn page_url(server: &MockServer, page: usize) -> String {
    format!("{}/user/repos?page={page}", server.uri())
}

/// Mount `pages` linked pages of `per_page` items each. Page 1 is served from
/// the bare listing URL.
async fn mount_pages(server: &MockServer, pages: usize, per_page: usize) {
    for n in (1..=pages).rev() {
        let items: Vec<_> = (0..per_page)
            .map(|i| repo_json((n * 100 + i) as u64))
            .collect();
        let mut response = ResponseTemplate::new(200).set_body_json(items);
        if n < pages {
            response = response.insert_header(
                "Link",
                format!(
                    r#"<{}>; rel="next", <{}>; rel="last""#,
                    page_url(server, n + 1),
                    page_url(server, pages)
                )
                .as_str(),
            );
        }
        let mock = Mock::given(method("GET"))
            .and(path("/user/repos"))
            .and(header("authorization", AUTH));
        let mock = if n == 1 {
            mock
        } else {
            mock.and(query_param("page", n.to_string()))
        };
        // Later-mounted mocks lose ties, so the unconstrained first page goes last.
        mock.respond_with(response).expect(1).mount(server).await;
    }
}

#[tokio::test]
async fn fetches_all_pages_in_order() {
    let server = MockServer::start().await;
    let (pages, per_page) = (4, 3);
    mount_pages(&server, pages, per_page).await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let projects = fetcher.fetch_all(&repos_url(&server.uri()), AUTH).await.unwrap();

    assert_eq!(projects.len(), pages * per_page);
    let ids: Vec<u64> = projects.iter().map(|p| p.id).collect();
    let expected: Vec<u64> = (1..=pages)
        .flat_map(|n| (0..per_page).map(move |i| (n * 100 + i) as u64))
        .collect();
    assert_eq!(ids, expected);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), pages);
}

#[tokio::test]
async fn single_page_without_link_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![repo_json(1), repo_json(2)]))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let projects = fetcher.fetch_all(&repos_url(&server.uri()), AUTH).await.unwrap();
    assert_eq!(projects, vec![
        Project {
            id: 1,
            name: "repo-1".into(),
            full_name: "octo/repo-1".into(),
        },
        Project {
            id: 2,
            name: "repo-2".into(),
            full_name: "octo/repo-2".into(),
        },
    ]);
}

#[tokio::test]
async fn empty_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let projects = fetcher.fetch_all(&repos_url(&server.uri()), AUTH).await.unwrap();
    assert!(projects.is_empty());
}

#[tokio::test]
async fn decode_failure_aborts_remaining_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"message\": \"oops\"}"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![repo_json(1)])
                .insert_header(
                    "Link",
                    format!(
                        r#"<{}>; rel="next", <{}>; rel="last""#,
                        page_url(&server, 2),
                        page_url(&server, 3)
                    )
                    .as_str(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let err = fetcher
        .fetch_all(&repos_url(&server.uri()), AUTH)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }), "got {err}");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn error_status_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let err = fetcher
        .fetch_all(&repos_url(&server.uri()), AUTH)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status, .. } if status.as_u16() == 401));
}

#[tokio::test]
async fn page_cap_stops_endless_cursor() {
    let server = MockServer::start().await;
    mount_pages(&server, 5, 1).await;

    let fetcher = RepoFetcher::new(reqwest::Client::new()).with_max_pages(3);
    let err = fetcher
        .fetch_all(&repos_url(&server.uri()), AUTH)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::PageLimit { max: 3 }));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    // Pages 4 and 5 were never requested, so skip the per-mock expectations.
    server.reset().await;
}

#[tokio::test]
async fn page_cap_allows_listing_of_exactly_cap_pages() {
    let server = MockServer::start().await;
    mount_pages(&server, 3, 2).await;

    let fetcher = RepoFetcher::new(reqwest::Client::new()).with_max_pages(3);
    let projects = fetcher.fetch_all(&repos_url(&server.uri()), AUTH).await.unwrap();
    assert_eq!(projects.len(), 6);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn cursor_cycle_is_rejected() {
    let server = MockServer::start().await;
    let self_link = format!(r#"<{}>; rel="next""#, page_url(&server, 1));
    Mock::given(method("GET"))
        .and(path("/user/repos"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vec![repo_json(1)])
                .insert_header("Link", self_link.as_str()),
        )
        .mount(&server)
        .await;

    let fetcher = RepoFetcher::new(reqwest::Client::new());
    let start = page_url(&server, 1);
    let err = fetcher.fetch_all(&start, AUTH).await.unwrap_err();
    assert!(matches!(err, FetchError::Cycle { .. }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
