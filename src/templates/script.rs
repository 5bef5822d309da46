//! Client-side behavior for the application page.
//!
//! The page reads its initial state from the `#notevault-state` JSON block
//! and talks to the `/api` routes. Most mutations reload the page so the
//! server-rendered sidebar and tabs stay authoritative.

pub const APP_SCRIPT: &str = r##"
const state = JSON.parse(document.getElementById('notevault-state').textContent);
const chatHistory = [{ role: 'assistant', content: state.welcome }];
let leaving = false;
let contentTimer = null;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async function api(method, url, body) {
    const options = { method: method, headers: {} };
    if (body !== undefined) {
        options.headers['Content-Type'] = 'application/json';
        options.body = JSON.stringify(body);
    }
    const response = await fetch(url, options);
    if (!response.ok) {
        throw new Error(method + ' ' + url + ' failed: ' + response.status);
    }
    const text = await response.text();
    return text ? JSON.parse(text) : null;
}

function noteUrl(id) {
    return '/notes/' + encodeURIComponent(id) + window.location.search;
}

function go(path) {
    leaving = true;
    window.location.href = path;
}

function reload() {
    leaving = true;
    window.location.reload();
}

function openDialog(id) {
    document.getElementById(id).classList.add('active');
}

function closeDialog(id) {
    document.getElementById(id).classList.remove('active');
}

function markDirty() {
    state.hasUnsavedChanges = true;
    const button = document.getElementById('save-button');
    if (button) button.disabled = false;
}

// ---------------------------------------------------------------------------
// Notes and folders
// ---------------------------------------------------------------------------

async function newNote(folder) {
    const note = await api('POST', '/api/notes', { folder: folder });
    go(noteUrl(note.id));
}

async function newUnsavedNote() {
    const note = await api('POST', '/api/notes/unsaved');
    go(noteUrl(note.id));
}

async function newFolder(parent) {
    const name = window.prompt('Folder name');
    if (!name) return;
    await api('POST', '/api/folders', { name: name, parent: parent });
    reload();
}

async function deleteNote(id) {
    if (!window.confirm('Delete this note?')) return;
    const result = await api('DELETE', '/api/notes/' + encodeURIComponent(id));
    go(result.redirect);
}

async function copyNote(id) {
    await api('POST', '/api/notes/' + encodeURIComponent(id) + '/copy');
    reload();
}

async function cutNote(id) {
    await api('POST', '/api/notes/' + encodeURIComponent(id) + '/cut');
    reload();
}

async function cutFolder(id) {
    await api('POST', '/api/folders/' + encodeURIComponent(id) + '/cut');
    reload();
}

async function pasteInto(folder) {
    await api('POST', '/api/paste', { folder: folder });
    reload();
}

async function flushContent() {
    if (contentTimer === null) return;
    clearTimeout(contentTimer);
    contentTimer = null;
    await sendContent();
}

async function sendContent() {
    const input = document.getElementById('content-input');
    if (!input || !state.activeNoteId) return;
    await api('POST', '/api/notes/' + encodeURIComponent(state.activeNoteId) + '/content', {
        content: input.value
    });
    markDirty();
}

async function saveActive() {
    if (!state.activeNoteId) return;
    await flushContent();
    const result = await api('POST', '/api/notes/' + encodeURIComponent(state.activeNoteId) + '/save');
    if (result.outcome === 'location_required') {
        state.pendingLocation = state.activeNoteId;
        openDialog('location-dialog');
        return;
    }
    reload();
}

async function saveLocation() {
    const id = state.pendingLocation;
    if (!id) return;
    const folder = document.getElementById('location-select').value;
    await api('POST', '/api/notes/' + encodeURIComponent(id) + '/location', { folder: folder });
    reload();
}

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

async function closeTab(id) {
    await flushContent();
    const result = await api('POST', '/api/tabs/' + encodeURIComponent(id) + '/close');
    if (result.result === 'confirmation_required') {
        openDialog('unsaved-dialog');
        return;
    }
    go(result.redirect);
}

async function resolveClose(action) {
    const result = await api('POST', '/api/pending-close/' + action);
    go(result.redirect);
}

async function cancelClose() {
    await api('POST', '/api/pending-close/cancel');
    closeDialog('unsaved-dialog');
}

// ---------------------------------------------------------------------------
// Search and settings
// ---------------------------------------------------------------------------

async function runSearch(event) {
    event.preventDefault();
    const query = document.getElementById('search-input').value;
    const list = document.getElementById('search-results');
    list.innerHTML = '';
    if (!query.trim()) return false;

    const results = await api('GET', '/api/search?q=' + encodeURIComponent(query));
    for (const result of results) {
        const item = document.createElement('li');
        const link = document.createElement('a');
        link.href = '/notes/' + encodeURIComponent(result.id);
        link.textContent = result.title + ' (' + result.matches.length + ')';
        item.appendChild(link);
        list.appendChild(item);
    }
    if (results.length === 0) {
        list.textContent = 'No matches';
    }
    return false;
}

async function saveSettings() {
    await api('PATCH', '/api/settings', {
        fontSize: parseInt(document.getElementById('font-size').value, 10),
        fontFamily: document.getElementById('font-family').value
    });
    reload();
}

// ---------------------------------------------------------------------------
// Assistant
// ---------------------------------------------------------------------------

function appendMessage(role, text) {
    const box = document.getElementById('chat-messages');
    const el = document.createElement('div');
    el.className = 'message ' + role;
    el.textContent = text;
    box.appendChild(el);
    box.scrollTop = box.scrollHeight;
    return el;
}

function addApplyButton(el, text) {
    if (!state.activeNoteId) return;
    const button = document.createElement('button');
    button.className = 'btn secondary';
    button.textContent = 'Apply to note';
    button.onclick = async function () {
        await api('POST', '/api/notes/' + encodeURIComponent(state.activeNoteId) + '/apply', { text: text });
        reload();
    };
    el.appendChild(document.createElement('br'));
    el.appendChild(button);
}

async function sendMessage(text) {
    const send = document.getElementById('chat-send');
    appendMessage('user', text);
    chatHistory.push({ role: 'user', content: text });
    const bubble = appendMessage('assistant', '');
    send.disabled = true;

    let reply = '';
    try {
        const response = await fetch('/api/chat', {
            method: 'POST',
            headers: { 'Content-Type': 'application/json' },
            body: JSON.stringify({
                messages: chatHistory,
                data: { currentNoteId: state.activeNoteId }
            })
        });
        if (!response.ok || !response.body) {
            throw new Error('chat failed: ' + response.status);
        }
        const reader = response.body.getReader();
        const decoder = new TextDecoder();
        while (true) {
            const { done, value } = await reader.read();
            if (done) break;
            reply += decoder.decode(value, { stream: true });
            bubble.textContent = reply;
        }
        chatHistory.push({ role: 'assistant', content: reply });
        addApplyButton(bubble, reply);
    } catch (err) {
        console.error(err);
        bubble.textContent = 'Sorry, I encountered an error. Please try again.';
    } finally {
        send.disabled = false;
    }
}

function sendChat(event) {
    event.preventDefault();
    const input = document.getElementById('chat-input');
    const text = input.value.trim();
    if (!text) return false;
    input.value = '';
    sendMessage(text);
    return false;
}

async function runTool(tool) {
    if (!state.activeNoteId) return;
    const result = await api('GET', '/api/assistant/prompts/' + tool + '?note=' + encodeURIComponent(state.activeNoteId));
    sendMessage(result.prompt);
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

(function () {
    const title = document.getElementById('title-input');
    if (title) {
        title.addEventListener('change', async function () {
            await flushContent();
            await api('POST', '/api/notes/' + encodeURIComponent(state.activeNoteId) + '/title', {
                title: title.value
            });
            reload();
        });
    }

    const content = document.getElementById('content-input');
    if (content) {
        content.addEventListener('input', function () {
            if (contentTimer !== null) clearTimeout(contentTimer);
            contentTimer = setTimeout(function () {
                contentTimer = null;
                sendContent();
            }, 400);
        });
    }

    document.addEventListener('click', function (event) {
        const link = event.target.closest('a[href^="/"]');
        if (link) leaving = true;
    });

    window.addEventListener('beforeunload', function (event) {
        if (contentTimer !== null) {
            event.preventDefault();
            event.returnValue = '';
            return;
        }
        if (!leaving && state.hasUnsavedChanges) {
            event.preventDefault();
            event.returnValue = '';
        }
    });

    if (state.pendingClose) {
        openDialog('unsaved-dialog');
    } else if (state.pendingLocation) {
        openDialog('location-dialog');
    }
})();
"##;
