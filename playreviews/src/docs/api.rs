/*!
# Play Reviews API documentation

This page describes the API endpoints available on Play Reviews. A machine
readable description is served at `/swagger.json`, and rendered at `/swagger`.

## Response format

Every API response is a JSON object:

```json
{
  "success": true,
  "data": [],
  "statusCode": 200,
  "timestamp": "2025-01-01T00:00:00.000Z",
  "count": 0,
  "message": "No reviews found"
}
```

`count` is present for list payloads, `message` only when there is something
to say about the payload. Errors have `success: false`, an `error` message, and
sometimes `details`:

```json
{
  "success": false,
  "error": "Missing required parameter: appid",
  "statusCode": 400,
  "timestamp": "2025-01-01T00:00:00.000Z"
}
```

## Reviews

Endpoint: `/app`

Example: `/app?appid=com.whatsapp&country=us&date=30d`

### Query Parameters

- `appid` - Required. The package name of the app.
- `country` - The two letter store country. Defaults to `US`.
- `lang` - A review language. When given, only that language is fetched and
  reviews keep the store's order. When omitted, the ten languages most likely
  to be used in `country` are fetched, merged without duplicates and sorted
  newest first. Languages that fail to load are skipped.
- `date` - Only return reviews written since this point. Either relative to
  now (`7d`, `2w`, `1m` for 30 days, `1y` for 365 days) or a date
  (`2025-01-01`, midnight UTC) or instant (`2025-01-01T12:00:00Z`).

### Response

`data` is a list of reviews:

- `id` - The store's id for the review.
- `userName`, `userImage` - The reviewer.
- `date` - When the review was written, as `YYYY-MM-DDTHH:MM:SS.sssZ`.
- `score`, `scoreText` - The star rating, 1 to 5.
- `url` - A link to the review on the store.
- `title`, `text` - The review.
- `replyDate`, `replyText` - The developer's reply, if any.
- `version` - The app version the review was written against.
- `thumbsUp`, `likes`, `helpful`, `positive`, `thumbsDown`, `dislikes`,
  `unhelpful`, `negative` - Engagement counters, `null` when unknown.
- `criterias` - Tags attached to the review.

An empty list is a successful response with the message `No reviews found`.

### Errors

- 400 - A parameter is missing or invalid, including the `date` expression.
- 503 - The store could not be reached for a single language request, or the
  request took longer than `reviews.request_timeout_sec`.

## App information

Endpoint: `/app/info?appid=<appid>[&country=<country>][&lang=<lang>]`

The store listing of the app, as the store returns it. Unknown apps are 404.

## Search

Endpoint: `/app/search?q=<terms>[&limit=<1-250, default 20>]`

Apps matching the search terms.

## Suggestions

Endpoint: `/app/suggestions?q=<partial terms>`

Search terms completing a partial search.

## Health

- `/health` - Always 200 while the server runs, with uptime, memory and version.
- `/__lbheartbeat__` - An empty 200 response for load balancers.
*/
